use log::*;
use market_common::Money;
use market_order_engine::{order_objects::PaymentNotification, traits::SessionRequest};
use serde::{Deserialize, Serialize};

use crate::SnapApiError;

/// The provider rejects item names longer than this.
pub const MAX_ITEM_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapTransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapItemDetail {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapTransactionRequest {
    pub transaction_details: SnapTransactionDetails,
    pub item_details: Vec<SnapItemDetail>,
}

impl TryFrom<SessionRequest> for SnapTransactionRequest {
    type Error = SnapApiError;

    /// The provider only takes whole currency units and insists that the gross amount equals the sum of the item
    /// lines. Unit prices are rounded here and nowhere else, and the gross amount is summed from the rounded lines.
    fn try_from(request: SessionRequest) -> Result<Self, Self::Error> {
        let item_details = request
            .line_items
            .into_iter()
            .map(|item| {
                Ok(SnapItemDetail {
                    id: item.id,
                    name: item.name.chars().take(MAX_ITEM_NAME_LEN).collect(),
                    price: whole_units(item.unit_price)?,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, SnapApiError>>()?;
        let gross_amount = item_details
            .iter()
            .try_fold(0i64, |total, item| {
                let line = item.price.checked_mul(item.quantity)?;
                total.checked_add(line)
            })
            .ok_or_else(|| SnapApiError::InvalidCurrencyAmount(format!("order {} is too large", request.order_id)))?;
        if whole_units(request.gross_amount).ok() != Some(gross_amount) {
            debug!(
                "🪝️ Order {} totals {} but its rounded lines sum to {gross_amount}",
                request.order_id, request.gross_amount
            );
        }
        Ok(Self {
            transaction_details: SnapTransactionDetails { order_id: request.order_id.to_string(), gross_amount },
            item_details,
        })
    }
}

fn whole_units(amount: Money) -> Result<i64, SnapApiError> {
    amount.to_whole_units().map_err(|e| SnapApiError::InvalidCurrencyAmount(e.to_string()))
}

/// The body of a session request response. On success `token` and `redirect_url` are set; on failure the provider
/// sends `error_messages`. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapTransactionResponse {
    pub token: Option<String>,
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub error_messages: Vec<String>,
}

/// An HTTP notification from the provider. Only `order_id` and `transaction_status` are required; everything else is
/// optional so that unusual notifications are still acknowledged and logged rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapNotification {
    pub order_id: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub signature_key: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl From<SnapNotification> for PaymentNotification {
    fn from(n: SnapNotification) -> Self {
        PaymentNotification {
            order_id: n.order_id.into(),
            transaction_status: n.transaction_status,
            fraud_status: n.fraud_status,
            payment_type: n.payment_type,
        }
    }
}
