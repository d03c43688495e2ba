//----------------------------------------------   Payment notifications  ----------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use log::*;
use market_order_engine::{
    order_objects::{PaymentNotification, ReconcileOutcome},
    traits::OrderManagement,
    OrderFlowError,
    ReconciliationApi,
};
use snap_tools::{verify_signature, SnapNotification};

use crate::{config::WebhookOptions, data_objects::JsonResponse, route};

route!(payment_webhook => Post "/webhook/payment" impl OrderManagement);
/// The payment provider's notification endpoint.
///
/// Webhook responses must always be 200, otherwise the provider keeps redelivering a notification that will never
/// succeed. Every failure is logged here and reported in the body only.
pub async fn payment_webhook<B: OrderManagement>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B>>,
    options: web::Data<WebhookOptions>,
) -> HttpResponse {
    trace!("🪝️ Received webhook request: {}", req.uri());
    let notification = match serde_json::from_slice::<SnapNotification>(&body) {
        Ok(n) => n,
        Err(e) => {
            error!("🪝️ Could not parse payment notification. {e}. Body: {}", String::from_utf8_lossy(&body));
            return HttpResponse::Ok().json(JsonResponse::failure("Invalid notification body."));
        },
    };
    if options.verify_signature && !verify_signature(&notification, options.server_key.reveal()) {
        let order_id = &notification.order_id;
        warn!("🪝️ Payment notification for order {order_id} has an invalid signature. Ignoring it.");
        return HttpResponse::Ok().json(JsonResponse::failure("Invalid signature."));
    }
    if let Some(id) = notification.transaction_id.as_deref() {
        debug!("🪝️ Notification for order {} refers to provider transaction {id}", notification.order_id);
    }
    let notification = PaymentNotification::from(notification);
    let order_id = notification.order_id.clone();
    let result = match api.handle_notification(notification).await {
        Ok(ReconcileOutcome::Transitioned(order)) => {
            JsonResponse::success(format!("Order {order_id} is {}.", order.status))
        },
        Ok(ReconcileOutcome::AlreadyFinal(status)) => {
            JsonResponse::success(format!("Order {order_id} was already {status}."))
        },
        Ok(ReconcileOutcome::StillPending) => JsonResponse::success(format!("Order {order_id} is still pending.")),
        Ok(ReconcileOutcome::LostRace) => JsonResponse::success(format!("Order {order_id} was already settled.")),
        Err(OrderFlowError::NotFound(s)) => {
            warn!("🪝️ Payment notification for an unknown order. {s} does not exist.");
            JsonResponse::failure("Unknown order.")
        },
        Err(e) => {
            error!("🪝️ Could not apply payment notification for order {order_id}. {e}");
            JsonResponse::failure("Notification could not be applied.")
        },
    };
    HttpResponse::Ok().json(result)
}
