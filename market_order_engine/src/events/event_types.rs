use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// An order has been committed. It may not have a payment session yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// An order moved from `PENDING` to `PAID`, and its stock sales were recorded in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// An order moved from `PENDING` to `FAILED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFailedEvent {
    pub order: Order,
    pub provider_status: String,
}

impl OrderFailedEvent {
    pub fn new<S: Into<String>>(order: Order, provider_status: S) -> Self {
        Self { order, provider_status: provider_status.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderCreated(OrderCreatedEvent),
    OrderPaid(OrderPaidEvent),
    OrderFailed(OrderFailedEvent),
}
