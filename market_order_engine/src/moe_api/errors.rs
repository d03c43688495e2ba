use thiserror::Error;

use crate::traits::{CatalogError, OrderStoreError, StockLedgerError};

/// The errors that order flow operations surface to callers.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid request: {0}")]
    ValidationError(String),
    #[error("{0} was not found")]
    NotFound(String),
    #[error("Order integrity error: {0}")]
    IntegrityError(String),
    #[error("Product {product_id} has insufficient stock for {requested} units")]
    InsufficientStock { product_id: i64, requested: i64 },
    #[error("Payment gateway error: {0}")]
    GatewayError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StockLedgerError> for OrderFlowError {
    fn from(e: StockLedgerError) -> Self {
        match e {
            StockLedgerError::DatabaseError(s) => Self::DatabaseError(s),
            StockLedgerError::InvalidQuantity(q) => {
                Self::ValidationError(format!("quantity must be positive, got {q}"))
            },
            StockLedgerError::InsufficientStock { product_id, requested } => {
                Self::InsufficientStock { product_id, requested }
            },
            StockLedgerError::ProductNotFound(id) => Self::NotFound(format!("Product {id}")),
        }
    }
}

impl From<OrderStoreError> for OrderFlowError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::DatabaseError(s) => Self::DatabaseError(s),
            OrderStoreError::IdempotencyConflict(key) => {
                Self::IntegrityError(format!("idempotency key {key} is already in use"))
            },
            OrderStoreError::OrderIdCollision(id) => Self::DatabaseError(format!("order id {id} is already in use")),
            OrderStoreError::OrderNotFound(id) => Self::NotFound(format!("Order {id}")),
            OrderStoreError::InvalidStatusTransition(s) => {
                Self::ValidationError(format!("orders cannot be settled as {s}"))
            },
            OrderStoreError::StockError(e) => e.into(),
        }
    }
}

impl From<CatalogError> for OrderFlowError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => Self::DatabaseError(s),
        }
    }
}
