use actix_web::{http::StatusCode, test, test::TestRequest, App};
use market_order_engine::{
    db_types::{MovementType, OrderStatusType},
    test_utils::prepare_env::seed_product,
    OrderManagement,
    ProductCatalog,
    StockLedger,
};
use serde_json::{json, Value};
use snap_tools::notification_signature;

use super::{
    helpers::{call, checkout, configure, tear_down, test_db, webhook_options, SERVER_KEY},
    mocks::gateway_that_succeeds,
};

fn notification(order_id: &str, transaction_status: &str, gross_amount: &str, key: &str) -> Value {
    json!({
        "order_id": order_id,
        "transaction_status": transaction_status,
        "status_code": "200",
        "gross_amount": gross_amount,
        "payment_type": "bank_transfer",
        "fraud_status": "accept",
        "signature_key": notification_signature(order_id, "200", gross_amount, key),
    })
}

fn webhook(body: Value) -> TestRequest {
    TestRequest::post().uri("/webhook/payment").set_json(body)
}

#[actix_web::test]
async fn signed_settlement_pays_the_order() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Tea", "12.00", 5).await;
    let config = configure(db.clone(), gateway_that_succeeds(1), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;
    let (_, order) = call(&app, checkout("alice", 1, &[(p.id, 2)], "key-paid")).await;
    let order_id = order["order_id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, webhook(notification(&order_id, "settlement", "24.00", SERVER_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true, "{body}");

    let stored = db.fetch_order_by_order_id(&order_id.as_str().into()).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatusType::Paid);
    assert_eq!(stored.payment_type.as_deref(), Some("bank_transfer"));
    assert_eq!(db.fetch_product(p.id).await.unwrap().unwrap().quantity, 3);

    // Redelivery is acknowledged and changes nothing
    let (status, body) = call(&app, webhook(notification(&order_id, "settlement", "24.00", SERVER_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let sales = db.fetch_stock_movements(p.id).await.unwrap();
    assert_eq!(sales.iter().filter(|m| m.movement_type == MovementType::Sale).count(), 1);
    tear_down(db).await;
}

#[actix_web::test]
async fn forged_notifications_are_acknowledged_but_ignored() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Tea", "12.00", 5).await;
    let config = configure(db.clone(), gateway_that_succeeds(1), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;
    let (_, order) = call(&app, checkout("bob", 1, &[(p.id, 1)], "key-forged")).await;
    let order_id = order["order_id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, webhook(notification(&order_id, "settlement", "12.00", "not-our-key"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let mut unsigned = notification(&order_id, "settlement", "12.00", SERVER_KEY);
    unsigned.as_object_mut().unwrap().remove("signature_key");
    let (status, _) = call(&app, webhook(unsigned)).await;
    assert_eq!(status, StatusCode::OK);

    let stored = db.fetch_order_by_order_id(&order_id.as_str().into()).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatusType::Pending);
    assert_eq!(db.fetch_product(p.id).await.unwrap().unwrap().quantity, 5);
    tear_down(db).await;
}

#[actix_web::test]
async fn unverified_mode_accepts_unsigned_notifications() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Tea", "12.00", 5).await;
    let config = configure(db.clone(), gateway_that_succeeds(1), webhook_options(false));
    let app = test::init_service(App::new().configure(config)).await;
    let (_, order) = call(&app, checkout("carol", 1, &[(p.id, 1)], "key-unsigned")).await;
    let order_id = order["order_id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, webhook(json!({"order_id": order_id, "transaction_status": "expire"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let stored = db.fetch_order_by_order_id(&order_id.as_str().into()).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatusType::Failed);
    tear_down(db).await;
}

#[actix_web::test]
async fn bad_notifications_still_get_200() {
    let db = test_db().await;
    let config = configure(db.clone(), gateway_that_succeeds(0), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;

    let garbage = TestRequest::post().uri("/webhook/payment").set_payload("this is not json");
    let (status, body) = call(&app, garbage).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let (status, body) = call(&app, webhook(json!({"transaction_status": "settlement"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let (status, body) = call(&app, webhook(notification("ORDER-unknown", "settlement", "1.00", SERVER_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Unknown order.");
    tear_down(db).await;
}

#[actix_web::test]
async fn unsellable_orders_stay_pending_and_are_acknowledged() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Cake", "30.00", 3).await;
    let config = configure(db.clone(), gateway_that_succeeds(1), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;
    let (_, order) = call(&app, checkout("dave", 1, &[(p.id, 3)], "key-scarce")).await;
    let order_id = order["order_id"].as_str().unwrap().to_string();
    // Someone else took the stock before the payment arrived
    db.add_stock_out(p.id, 2, Default::default()).await.unwrap();

    let (status, body) = call(&app, webhook(notification(&order_id, "capture", "90.00", SERVER_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let stored = db.fetch_order_by_order_id(&order_id.as_str().into()).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatusType::Pending);
    assert_eq!(db.fetch_product(p.id).await.unwrap().unwrap().quantity, 1);
    tear_down(db).await;
}
