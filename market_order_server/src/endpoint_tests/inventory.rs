use actix_web::{http::StatusCode, test, test::TestRequest, App};
use market_order_engine::{db_types::MovementType, test_utils::prepare_env::seed_product, ProductCatalog, StockLedger};
use serde_json::json;

use super::{
    helpers::{call, configure, tear_down, test_db, webhook_options},
    mocks::MockGateway,
};

fn stock_in(body: serde_json::Value) -> TestRequest {
    TestRequest::post().uri("/api/stock/in").insert_header(("X-User-Id", "warehouse")).set_json(body)
}

#[actix_web::test]
async fn restocking_adds_to_the_ledger() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Tea", "12.00", 2).await;
    let config = configure(db.clone(), MockGateway::new(), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;

    let body = json!({"product_id": p.id, "quantity": 5, "reference_type": "PO", "reference_id": "PO-2024-001"});
    let (status, movement) = call(&app, stock_in(body)).await;

    assert_eq!(status, StatusCode::OK, "{movement}");
    assert_eq!(movement["movement_type"], "IN");
    assert_eq!(movement["quantity"], 5);
    assert_eq!(movement["reference_id"], "PO-2024-001");
    assert_eq!(db.fetch_product(p.id).await.unwrap().unwrap().quantity, 7);
    let movements = db.fetch_stock_movements(p.id).await.unwrap();
    assert_eq!(movements.len(), 2);
    assert!(movements.iter().all(|m| m.movement_type == MovementType::In));
    tear_down(db).await;
}

#[actix_web::test]
async fn bad_restocks_are_rejected() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Tea", "12.00", 2).await;
    let config = configure(db.clone(), MockGateway::new(), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;

    let (status, _) = call(&app, stock_in(json!({"product_id": p.id, "quantity": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, stock_in(json!({"product_id": 4242, "quantity": 3}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(db.fetch_product(p.id).await.unwrap().unwrap().quantity, 2);
    tear_down(db).await;
}
