use log::*;
use market_order_engine::{db_types::Order, OrderQueryApi, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the orphan monitor. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// An orphan is a PENDING order that never received a payment session, usually because the gateway failed right after
/// the order was committed. The monitor only reports them. Recovery is up to an operator; the order is never
/// re-sessioned or cancelled from here.
pub fn start_orphan_monitor(
    db: SqliteDatabase,
    interval: std::time::Duration,
    min_age: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = OrderQueryApi::new(db);
        info!("🕰️ Orphaned order monitor started");
        loop {
            timer.tick().await;
            trace!("🕰️ Looking for orphaned orders");
            match api.orphaned_orders(min_age).await {
                Ok(orders) if orders.is_empty() => debug!("🕰️ No orphaned orders"),
                Ok(orders) => {
                    warn!(
                        "🕰️ {} orders older than {} minutes have no payment session: {}",
                        orders.len(),
                        min_age.num_minutes(),
                        order_list(&orders)
                    );
                },
                Err(e) => {
                    error!("🕰️ Error running orphaned order check: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} user_id: {} key: {}", o.id, o.order_id, o.user_id, o.idempotency_key))
        .collect::<Vec<String>>()
        .join(", ")
}
