//! Client for the hosted-payment ("Snap") provider.
//!
//! [`SnapApi`] opens checkout sessions and implements the order engine's
//! [`PaymentGateway`](market_order_engine::PaymentGateway) seam. [`SnapNotification`] is the provider's webhook body,
//! and [`verify_signature`] checks that a notification was signed with our server key.
mod api;
mod config;
mod data_objects;
mod error;
mod signature;

pub use api::SnapApi;
pub use config::SnapConfig;
pub use data_objects::{
    SnapItemDetail,
    SnapNotification,
    SnapTransactionDetails,
    SnapTransactionRequest,
    SnapTransactionResponse,
};
pub use error::SnapApiError;
pub use signature::{notification_signature, verify_signature};
