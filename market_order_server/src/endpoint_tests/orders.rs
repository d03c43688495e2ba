use actix_web::{http::StatusCode, test, test::TestRequest, App};
use market_order_engine::{
    db_types::OrderStatusType,
    test_utils::prepare_env::seed_product,
    traits::SessionOutcome,
    OrderManagement,
};

use super::{
    helpers::{call, checkout, configure, tear_down, test_db, webhook_options},
    mocks::{gateway_that_succeeds, MockGateway},
};

#[actix_web::test]
async fn checkout_returns_a_payment_session() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Kopi Susu", "18000.00", 10).await;
    let config = configure(db.clone(), gateway_that_succeeds(1), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;

    let (status, body) = call(&app, checkout("alice", 1, &[(p.id, 2)], "key-1")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order_id = body["order_id"].as_str().unwrap().to_string();
    assert!(order_id.starts_with("ORDER-"));
    assert_eq!(body["session_token"], format!("tok-{order_id}"));
    assert_eq!(body["redirect_url"], format!("https://pay.example.com/{order_id}"));
    assert_eq!(body["status"], "PENDING");

    // The retry hits the stored order. The mock fails the test if the gateway is called twice.
    let (status, replay) = call(&app, checkout("alice", 1, &[(p.id, 5)], "key-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay, body);

    let (status, resumed) =
        call(&app, TestRequest::post().uri("/api/orders/resume/key-1").insert_header(("X-User-Id", "alice"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed, body);
    tear_down(db).await;
}

#[actix_web::test]
async fn requests_without_a_user_are_unauthorized() {
    let db = test_db().await;
    let config = configure(db.clone(), MockGateway::new(), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;

    let req = TestRequest::get().uri("/api/orders");
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "The request did not identify a user. Expected the X-User-Id header.");

    let (status, _) = call(&app, TestRequest::get().uri("/api/orders").insert_header(("X-User-Id", "  "))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    tear_down(db).await;
}

#[actix_web::test]
async fn invalid_carts_are_bad_requests() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Tea", "12.00", 10).await;
    let config = configure(db.clone(), MockGateway::new(), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;

    for req in [
        checkout("bob", 1, &[(p.id, 1), (9999, 1)], "key-unknown"),
        checkout("bob", 2, &[(p.id, 1)], "key-wrong-merchant"),
        checkout("bob", 1, &[(p.id, -1)], "key-negative"),
        checkout("bob", 1, &[(p.id, 1)], ""),
    ] {
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(body["error"].is_string());
    }

    let garbage = TestRequest::post()
        .uri("/api/orders")
        .insert_header(("X-User-Id", "bob"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"merchant_id\": 1, \"items\": ");
    let (status, body) = call(&app, garbage).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Could not read request body"));
    tear_down(db).await;
}

#[actix_web::test]
async fn gateway_failures_are_bad_gateway_and_resume_is_a_conflict() {
    let db = test_db().await;
    let p = seed_product(&db, 1, "Tea", "12.00", 10).await;
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().times(1).returning(|_| SessionOutcome::TransportError("timed out".into()));
    let config = configure(db.clone(), gateway, webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;

    let (status, body) = call(&app, checkout("carol", 1, &[(p.id, 1)], "key-orphan")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY, "{body}");
    let order = db.fetch_order_by_idempotency_key("key-orphan").await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Pending);
    assert!(order.session_token.is_none());

    let (status, _) = call(&app, checkout("carol", 1, &[(p.id, 1)], "key-orphan")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let resume = TestRequest::post().uri("/api/orders/resume/key-orphan").insert_header(("X-User-Id", "carol"));
    let (status, _) = call(&app, resume).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let resume = TestRequest::post().uri("/api/orders/resume/never-used").insert_header(("X-User-Id", "carol"));
    let (status, _) = call(&app, resume).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}

#[actix_web::test]
async fn users_only_see_their_own_orders() {
    let db = test_db().await;
    let tea = seed_product(&db, 1, "Tea", "12.00", 10).await;
    let cake = seed_product(&db, 1, "Cake", "30.50", 10).await;
    let config = configure(db.clone(), gateway_that_succeeds(2), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;
    let (_, first) = call(&app, checkout("dave", 1, &[(tea.id, 2), (cake.id, 1)], "key-d1")).await;
    let (_, _) = call(&app, checkout("erin", 1, &[(tea.id, 1)], "key-e1")).await;
    let order_id = first["order_id"].as_str().unwrap();

    let (status, mine) = call(&app, TestRequest::get().uri("/api/orders").insert_header(("X-User-Id", "dave"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["order_id"], order_id);
    assert_eq!(mine[0]["total_amount"], "54.50");

    let uri = format!("/api/orders/{order_id}");
    let (status, detail) = call(&app, TestRequest::get().uri(&uri).insert_header(("X-User-Id", "dave"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["order_id"], order_id);
    assert_eq!(detail["items"].as_array().unwrap().len(), 2);
    assert_eq!(detail["items"][1]["product_name"], "Cake");
    assert_eq!(detail["items"][0]["subtotal"], "24.00");

    let (status, _) = call(&app, TestRequest::get().uri(&uri).insert_header(("X-User-Id", "erin"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) =
        call(&app, TestRequest::get().uri("/api/orders/ORDER-missing").insert_header(("X-User-Id", "dave"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}

#[actix_web::test]
async fn merchant_orders_are_paginated() {
    let db = test_db().await;
    let tea = seed_product(&db, 7, "Tea", "12.00", 10).await;
    let config = configure(db.clone(), gateway_that_succeeds(3), webhook_options(true));
    let app = test::init_service(App::new().configure(config)).await;
    for key in ["key-m1", "key-m2", "key-m3"] {
        let (status, _) = call(&app, checkout("frank", 7, &[(tea.id, 1)], key)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let req = TestRequest::get().uri("/api/merchants/7/orders?page=1&limit=2").insert_header(("X-User-Id", "frank"));
    let (status, page) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["orders"].as_array().unwrap().len(), 2);

    let req = TestRequest::get().uri("/api/merchants/7/orders?page=2&limit=2").insert_header(("X-User-Id", "frank"));
    let (_, page) = call(&app, req).await;
    assert_eq!(page["orders"].as_array().unwrap().len(), 1);
    assert_eq!(page["orders"][0]["idempotency_key"], "key-m1");

    let req = TestRequest::get()
        .uri("/api/merchants/7/orders?page=9223372036854775807&limit=100")
        .insert_header(("X-User-Id", "frank"));
    let (status, page) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["orders"].as_array().unwrap().is_empty());
    assert_eq!(page["total"], 3);

    let req = TestRequest::get().uri("/api/merchants/8/orders").insert_header(("X-User-Id", "frank"));
    let (_, page) = call(&app, req).await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["limit"], 10);
    tear_down(db).await;
}
