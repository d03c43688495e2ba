use cucumber::{then, when};
use market_order_engine::{
    db_types::{MovementType, OrderStatusType},
    order_objects::{CartItem, CreateOrderRequest, PaymentNotification},
    InventoryApi,
    OrderManagement,
    ProductCatalog,
    StockLedger,
};

use crate::cucumber::MarketWorld;

async fn checkout(world: &mut MarketWorld, user: String, items: Vec<CartItem>, key: String) {
    let request = CreateOrderRequest { merchant_id: 1, items, idempotency_key: key };
    world.system().orders.create_order(&user, request).await.expect("Error creating order");
}

#[when(expr = "{word} checks out {int} {string} with key {string}")]
async fn check_out_one(world: &mut MarketWorld, user: String, qty: i64, name: String, key: String) {
    let items = vec![CartItem::new(world.product(&name).id, qty)];
    checkout(world, user, items, key).await;
}

#[when(expr = "{word} checks out {int} {string} and {int} {string} with key {string}")]
async fn check_out_two(
    world: &mut MarketWorld,
    user: String,
    qty_a: i64,
    name_a: String,
    qty_b: i64,
    name_b: String,
    key: String,
) {
    let items = vec![CartItem::new(world.product(&name_a).id, qty_a), CartItem::new(world.product(&name_b).id, qty_b)];
    checkout(world, user, items, key).await;
}

#[when(expr = "the provider reports {string} via {string} for key {string}")]
async fn provider_reports(world: &mut MarketWorld, status: String, payment_type: String, key: String) {
    let sys = world.system();
    let order = sys.db.fetch_order_by_idempotency_key(&key).await.unwrap().expect("No order for key");
    let notification = PaymentNotification::new(order.order_id, status).with_payment_type(payment_type);
    // Failures are acknowledged at the transport boundary, so they are not step failures either.
    let _ = sys.reconciler.handle_notification(notification).await;
}

#[then(expr = "the order for key {string} is {word}")]
async fn order_status(world: &mut MarketWorld, key: String, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Invalid status");
    let order = world.system().db.fetch_order_by_idempotency_key(&key).await.unwrap().expect("No order for key");
    assert_eq!(order.status, expected);
}

#[then(expr = "{string} has {int} in stock")]
async fn in_stock(world: &mut MarketWorld, name: String, quantity: i64) {
    let id = world.product(&name).id;
    let product = world.system().db.fetch_product(id).await.unwrap().expect("Product vanished");
    assert_eq!(product.quantity, quantity);
}

#[then(regex = r#"^"([^"]+)" has (\d+) sales? recorded$"#)]
async fn sales_recorded(world: &mut MarketWorld, name: String, count: usize) {
    let id = world.product(&name).id;
    let movements = world.system().db.fetch_stock_movements(id).await.unwrap();
    let sales = movements.iter().filter(|m| m.movement_type == MovementType::Sale).count();
    assert_eq!(sales, count);
}

#[then(expr = "the ledger for {string} matches its stock")]
async fn ledger_matches(world: &mut MarketWorld, name: String) {
    let id = world.product(&name).id;
    let report = InventoryApi::new(world.system().db.clone()).stock_report(id).await.unwrap();
    assert!(report.is_consistent(), "{report:?}");
}
