//! # Backend contracts
//!
//! This module defines the interfaces that a storage backend has to provide for the order engine, plus the seam to the
//! external payment gateway.
//!
//! * [`OrderManagement`] is the Order Store: durable order headers and items, lookups by external order id and by
//!   idempotency key, and the guarded status transition used by webhook reconciliation.
//! * [`ProductCatalog`] is the read-only product lookup owned by the catalog service.
//! * [`StockLedger`] exposes the append-only inventory ledger and its guarded aggregate update.
//! * [`OrderQueries`] provides read models: order detail, per-user and per-merchant history, orphaned orders.
//! * [`MarketplaceDatabase`] ties them together. A single backend (e.g. [`crate::SqliteDatabase`]) implements all of
//!   them.
//! * [`PaymentGateway`] is implemented by the hosted-payment client, not by the database.
mod marketplace_database;
mod order_management;
mod order_queries;
mod payment_gateway;
mod product_catalog;
mod stock_ledger;

pub use marketplace_database::MarketplaceDatabase;
pub use order_management::{OrderManagement, OrderStoreError};
pub use order_queries::{OrderPage, OrderQueries, Pagination};
pub use payment_gateway::{PaymentGateway, PaymentSession, SessionLineItem, SessionOutcome, SessionRequest};
pub use product_catalog::{CatalogError, ProductCatalog};
pub use stock_ledger::{StockLedger, StockLedgerError};
