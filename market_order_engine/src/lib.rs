//! Market Order Engine
//!
//! The order engine turns shopping carts into durable orders for a multi-merchant marketplace, obtains a hosted
//! payment session for each order exactly once, and applies the payment provider's asynchronous status notifications
//! to orders and inventory.
//!
//! The library is divided into three main sections:
//! 1. Backend contracts ([`mod@traits`]) and their SQLite implementation ([`SqliteDatabase`]). All coordination
//!    between concurrent requests happens in the database: unique constraints for idempotency keys, and conditional
//!    updates for status transitions and stock decrements. There are no in-process locks.
//! 2. The public API ([`OrderFlowApi`], [`ReconciliationApi`], [`InventoryApi`], [`OrderQueryApi`]). Each API is
//!    constructed with the backend (and for order creation, the [`traits::PaymentGateway`]) it needs.
//! 3. Events ([`mod@events`]). Subscribers are told about created, paid and failed orders after the fact.
pub mod db_types;
pub mod events;
mod moe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use moe_api::{
    errors::OrderFlowError,
    inventory_api::{InventoryApi, StockReport},
    order_flow_api::OrderFlowApi,
    order_objects,
    order_query_api::OrderQueryApi,
    reconciliation_api::{map_provider_status, ReconciliationApi},
};
pub use traits::{
    MarketplaceDatabase,
    OrderManagement,
    OrderQueries,
    PaymentGateway,
    ProductCatalog,
    StockLedger,
};
