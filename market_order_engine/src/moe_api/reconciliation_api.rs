use std::fmt::Debug;

use log::*;

use crate::{
    db_types::OrderStatusType,
    events::{EventProducers, OrderFailedEvent, OrderPaidEvent},
    moe_api::{
        errors::OrderFlowError,
        order_objects::{PaymentNotification, ReconcileOutcome},
    },
    traits::OrderManagement,
};

/// Maps the provider's transaction status vocabulary onto order statuses.
///
/// `settlement` and `capture` mean the money has arrived. `cancel`, `expire` and `deny` are final failures. Anything
/// else (`pending`, `authorize`, unknown values) leaves the order where it is.
pub fn map_provider_status(provider_status: &str) -> OrderStatusType {
    match provider_status.trim().to_ascii_lowercase().as_str() {
        "settlement" | "capture" => OrderStatusType::Paid,
        "cancel" | "expire" | "deny" => OrderStatusType::Failed,
        _ => OrderStatusType::Pending,
    }
}

/// `ReconciliationApi` applies payment notifications to orders.
///
/// Notifications arrive at least once and in any order. Applying the same notification twice, or a stale one after a
/// newer one, never changes a terminal order and never records a second round of stock sales.
pub struct ReconciliationApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> ReconciliationApi<B>
where B: OrderManagement
{
    /// Applies one notification.
    ///
    /// ## Failure modes:
    /// * [`OrderFlowError::NotFound`] if the order id is unknown.
    /// * [`OrderFlowError::InsufficientStock`] if the order was paid for but an item cannot be sold. The whole
    ///   transition is rolled back and the order stays `PENDING`.
    pub async fn handle_notification(
        &self,
        notification: PaymentNotification,
    ) -> Result<ReconcileOutcome, OrderFlowError> {
        let PaymentNotification { order_id, transaction_status, fraud_status, payment_type } = notification;
        let order = self
            .db
            .fetch_order_by_order_id(&order_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order {order_id}")))?;
        if let Some(fraud) = fraud_status.as_deref() {
            debug!("🪝️ Order {order_id}: provider status {transaction_status}, fraud status {fraud}");
        }
        if order.status.is_terminal() {
            debug!("🪝️ Order {order_id} is already {}. Ignoring '{transaction_status}'.", order.status);
            return Ok(ReconcileOutcome::AlreadyFinal(order.status));
        }
        let new_status = map_provider_status(&transaction_status);
        if new_status == OrderStatusType::Pending {
            debug!("🪝️ Order {order_id}: '{transaction_status}' does not settle the order yet");
            return Ok(ReconcileOutcome::StillPending);
        }
        let settled = match self.db.settle_order(&order_id, new_status, payment_type.as_deref()).await {
            Ok(settled) => settled,
            Err(e) => {
                error!("🪝️ Could not settle order {order_id} as {new_status}: {e}. The order remains PENDING.");
                return Err(e.into());
            },
        };
        let Some(order) = settled else {
            info!("🪝️ Order {order_id} was settled by a concurrent notification");
            return Ok(ReconcileOutcome::LostRace);
        };
        info!("🪝️ Order {order_id} is now {}", order.status);
        match order.status {
            OrderStatusType::Paid => self.producers.publish_order_paid(OrderPaidEvent::new(order.clone())).await,
            OrderStatusType::Failed => {
                self.producers.publish_order_failed(OrderFailedEvent::new(order.clone(), transaction_status)).await
            },
            OrderStatusType::Pending => {},
        }
        Ok(ReconcileOutcome::Transitioned(order))
    }
}
