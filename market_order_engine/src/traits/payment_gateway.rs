use market_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::OrderId;

/// Everything the hosted-payment provider needs to open a checkout session for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub order_id: OrderId,
    pub gross_amount: Money,
    pub line_items: Vec<SessionLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

/// The result of asking the provider for a session.
///
/// The presence of a session is the only success signal. A provider may hand back a usable session together with a
/// warning (an error status, a partially malformed body); that warning is carried in `advisory` and does not turn the
/// call into a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Created { session: PaymentSession, advisory: Option<String> },
    NoSession,
    TransportError(String),
}

/// The outbound seam to the hosted-payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_session(&self, request: SessionRequest) -> SessionOutcome;
}
