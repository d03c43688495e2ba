//! # Market order server
//! This crate hosts the HTTP surface of the marketplace order engine. It is responsible for:
//! * Accepting checkout requests from authenticated shoppers and returning a hosted payment session.
//! * Receiving payment status notifications from the payment provider and applying them to orders.
//! * Exposing order history and restocking endpoints.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: Order and inventory routes. The caller's user id is read from the header configured in
//!   `MOS_USER_ID_HEADER`, which the upstream authentication layer sets.
//! * `/webhook/payment`: The payment provider's notification endpoint. It always answers 200.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod orphan_monitor;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
