use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
pub use market_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The externally visible order id, e.g. `ORDER-5f0c...`. The internal row id is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

pub const ORDER_ID_PREFIX: &str = "ORDER-";

impl OrderId {
    /// Generates a fresh order id with a random v4 uuid suffix. Uniqueness is probabilistic; the database unique
    /// constraint is the final arbiter.
    pub fn generate() -> Self {
        Self(format!("{ORDER_ID_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been created and is awaiting a payment outcome.
    Pending,
    /// The payment provider has settled or captured the payment. Terminal.
    Paid,
    /// The payment was cancelled, expired or denied. Terminal.
    Failed,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Failed)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "PENDING"),
            OrderStatusType::Paid => write!(f, "PAID"),
            OrderStatusType::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to PENDING");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub idempotency_key: String,
    pub user_id: String,
    pub merchant_id: i64,
    pub status: OrderStatusType,
    pub total_amount: Money,
    pub payment_type: Option<String>,
    pub session_token: Option<String>,
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// An order is only usable by the client once both the session token and redirect url have been stored.
    pub fn has_session(&self) -> bool {
        self.session_token.as_deref().is_some_and(|s| !s.is_empty()) &&
            self.redirect_url.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// A fully priced order, ready to be persisted together with its items.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub idempotency_key: String,
    pub user_id: String,
    pub merchant_id: i64,
    pub total_amount: Money,
    pub items: Vec<NewOrderItem>,
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl NewOrderItem {
    /// Snapshots the unit price and computes the exact subtotal. `None` if the subtotal is too large to represent.
    pub fn new(product_id: i64, quantity: i64, unit_price: Money) -> Option<Self> {
        let subtotal = unit_price.checked_mul(quantity)?;
        Some(Self { product_id, quantity, unit_price, subtotal })
    }
}

/// An order item joined with the product name, for order detail views.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItemDetail {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub merchant_id: i64,
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub merchant_id: i64,
    pub name: String,
    pub price: Money,
}

impl NewProduct {
    pub fn new<S: Into<String>>(merchant_id: i64, name: S, price: Money) -> Self {
        Self { merchant_id, name: name.into(), price }
    }
}

//--------------------------------------     StockMovement     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    In,
    Out,
    Adjust,
    Sale,
}

impl MovementType {
    /// The sign this movement contributes to the on-hand quantity.
    pub fn sign(&self) -> i64 {
        match self {
            MovementType::In | MovementType::Adjust => 1,
            MovementType::Out | MovementType::Sale => -1,
        }
    }
}

impl Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementType::In => write!(f, "IN"),
            MovementType::Out => write!(f, "OUT"),
            MovementType::Adjust => write!(f, "ADJUST"),
            MovementType::Sale => write!(f, "SALE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What caused a stock movement, e.g. `ORDER` / `ORDER-5f0c...`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockReference {
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
}

pub const ORDER_REFERENCE_TYPE: &str = "ORDER";

impl StockReference {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<T: Into<String>, I: Into<String>>(reference_type: T, reference_id: I) -> Self {
        Self { reference_type: Some(reference_type.into()), reference_id: Some(reference_id.into()) }
    }

    pub fn for_order(order_id: &OrderId) -> Self {
        Self::new(ORDER_REFERENCE_TYPE, order_id.as_str())
    }
}

/// The signed sum of a product's ledger. For a product whose movements were all recorded through the ledger, this
/// equals its current on-hand quantity.
pub fn ledger_balance(movements: &[StockMovement]) -> i64 {
    movements.iter().map(|m| m.movement_type.sign() * m.quantity).sum()
}
