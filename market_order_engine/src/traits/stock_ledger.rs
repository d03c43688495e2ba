use thiserror::Error;

use crate::db_types::{StockMovement, StockReference};

/// The inventory ledger.
///
/// Every method writes the aggregate change and the ledger row together; on their own they run in a fresh
/// transaction. Sales that belong to an order transition go through [`super::OrderManagement::settle_order`] instead,
/// which composes the same low-level calls inside its own transaction.
#[allow(async_fn_in_trait)]
pub trait StockLedger {
    async fn add_stock_in(
        &self,
        product_id: i64,
        quantity: i64,
        reference: StockReference,
    ) -> Result<StockMovement, StockLedgerError>;

    async fn add_stock_out(
        &self,
        product_id: i64,
        quantity: i64,
        reference: StockReference,
    ) -> Result<StockMovement, StockLedgerError>;

    async fn add_stock_sale(
        &self,
        product_id: i64,
        quantity: i64,
        reference: StockReference,
    ) -> Result<StockMovement, StockLedgerError>;

    /// All ledger rows for the product, oldest first.
    async fn fetch_stock_movements(&self, product_id: i64) -> Result<Vec<StockMovement>, StockLedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum StockLedgerError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Stock quantities must be positive. Got {0}")]
    InvalidQuantity(i64),
    #[error("Product {product_id} has insufficient stock for {requested} units")]
    InsufficientStock { product_id: i64, requested: i64 },
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
}

impl From<sqlx::Error> for StockLedgerError {
    fn from(e: sqlx::Error) -> Self {
        StockLedgerError::DatabaseError(e.to_string())
    }
}
