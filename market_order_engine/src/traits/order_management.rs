use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType},
    traits::{PaymentSession, StockLedgerError},
};

/// The Order Store.
///
/// Orders and their items are written once, in a single transaction. Afterwards an order is only touched twice: when
/// its payment session is attached, and when a webhook moves it out of `PENDING`.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order_by_idempotency_key(&self, key: &str) -> Result<Option<Order>, OrderStoreError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderStoreError>;

    /// Persists the order header and all of its items atomically.
    ///
    /// ## Failure modes:
    /// * [`OrderStoreError::IdempotencyConflict`] if another order already holds the idempotency key. Nothing is
    ///   written in that case.
    /// * [`OrderStoreError::OrderIdCollision`] if the generated external order id is already taken.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Stores the session token and redirect url on an already committed order.
    async fn attach_payment_session(
        &self,
        order_id: &OrderId,
        session: &PaymentSession,
    ) -> Result<Order, OrderStoreError>;

    /// Applies a webhook outcome to a `PENDING` order, as a single transaction:
    /// * The status (and payment type) is updated, but only if the order is still `PENDING`. The check and the write
    ///   are one conditional `UPDATE`, so concurrent deliveries cannot both win.
    /// * If the new status is `PAID`, every item on the order is recorded as a stock sale. If any item lacks stock, the
    ///   whole transaction rolls back and the order stays `PENDING`.
    ///
    /// Returns `None` if the order was no longer `PENDING` (already terminal, or another delivery won the race).
    async fn settle_order(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
        payment_type: Option<&str>,
    ) -> Result<Option<Order>, OrderStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("An order with idempotency key {0} already exists")]
    IdempotencyConflict(String),
    #[error("The generated order id {0} is already in use")]
    OrderIdCollision(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("An order status cannot be set to {0}")]
    InvalidStatusTransition(OrderStatusType),
    #[error("{0}")]
    StockError(#[from] StockLedgerError),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}
