//! # Order engine public API
//!
//! The API is split by concern, and each part only asks for the backend traits it actually uses:
//!
//! * [`order_flow_api`] turns a cart into an order and obtains its payment session, exactly once per idempotency key.
//! * [`reconciliation_api`] applies payment provider notifications to orders and inventory.
//! * [`inventory_api`] records inbound and outbound stock and reports on the ledger.
//! * [`order_query_api`] serves order detail and order history.
//!
//! # API usage
//!
//! Every API is created by handing it a backend (and, for order creation, a payment gateway):
//!
//! ```rust,ignore
//! use market_order_engine::{OrderQueryApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = OrderQueryApi::new(db);
//! let detail = api.order_detail(&order_id).await?;
//! ```
pub mod errors;
pub mod inventory_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod order_query_api;
pub mod reconciliation_api;
