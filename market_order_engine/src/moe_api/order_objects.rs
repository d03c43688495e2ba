use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, OrderItemDetail, OrderStatusType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl CartItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self { product_id, quantity }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub merchant_id: i64,
    pub items: Vec<CartItem>,
    pub idempotency_key: String,
}

/// What the client gets back from creating or resuming an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub session_token: String,
    pub redirect_url: String,
    pub status: OrderStatusType,
}

impl OrderResponse {
    /// Returns `None` if the order does not have a complete payment session yet.
    pub fn for_order(order: &Order) -> Option<Self> {
        if !order.has_session() {
            return None;
        }
        Some(Self {
            order_id: order.order_id.clone(),
            session_token: order.session_token.clone().unwrap_or_default(),
            redirect_url: order.redirect_url.clone().unwrap_or_default(),
            status: order.status,
        })
    }
}

/// A payment status notification, as relevant to the engine. Transport concerns (signatures, status codes) are
/// handled before this point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub order_id: OrderId,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    pub payment_type: Option<String>,
}

impl PaymentNotification {
    pub fn new<O: Into<OrderId>, S: Into<String>>(order_id: O, transaction_status: S) -> Self {
        Self {
            order_id: order_id.into(),
            transaction_status: transaction_status.into(),
            fraud_status: None,
            payment_type: None,
        }
    }

    pub fn with_payment_type<S: Into<String>>(mut self, payment_type: S) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }

    pub fn with_fraud_status<S: Into<String>>(mut self, fraud_status: S) -> Self {
        self.fraud_status = Some(fraud_status.into());
        self
    }
}

/// What a notification did to its order. Every variant is a success from the provider's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order left `PENDING` because of this notification.
    Transitioned(Order),
    /// The order was already terminal. Duplicate or out-of-order delivery.
    AlreadyFinal(OrderStatusType),
    /// The provider status maps to `PENDING`, so there is nothing to do yet.
    StillPending,
    /// Another delivery settled the order between our read and our conditional update.
    LostRace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}
