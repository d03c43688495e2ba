use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
};
use log::debug;
use market_common::Secret;
use market_order_engine::{
    events::EventProducers,
    order_objects::{CartItem, CreateOrderRequest},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    InventoryApi,
    MarketplaceDatabase,
    OrderFlowApi,
    OrderQueryApi,
    ReconciliationApi,
    SqliteDatabase,
};
use serde_json::Value;

use super::mocks::MockGateway;
use crate::{
    config::{UserIdHeader, WebhookOptions},
    helpers::json_error_handler,
    routes::{CreateOrderRoute, MerchantOrdersRoute, MyOrdersRoute, OrderByIdRoute, ResumeOrderRoute, StockInRoute},
    webhook_routes::PaymentWebhookRoute,
};

pub const SERVER_KEY: &str = "SB-Mid-server-endpoint-tests";

pub async fn test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database")
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let path = db.url().trim_start_matches("sqlite://").to_string();
    db.close().await.ok();
    if let Err(e) = std::fs::remove_file(&path) {
        debug!("Could not remove test database {path}: {e}");
    }
}

pub fn webhook_options(verify_signature: bool) -> WebhookOptions {
    WebhookOptions { verify_signature, server_key: Secret::new(SERVER_KEY.to_string()) }
}

/// Registers every route the way the server does, with a mocked payment gateway in front of a real database.
pub fn configure(db: SqliteDatabase, gateway: MockGateway, options: WebhookOptions) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let producers = EventProducers::default();
        let api_scope = web::scope("/api")
            .app_data(web::Data::new(UserIdHeader::default()))
            .service(CreateOrderRoute::<SqliteDatabase, MockGateway>::new())
            .service(ResumeOrderRoute::<SqliteDatabase, MockGateway>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(MerchantOrdersRoute::<SqliteDatabase>::new())
            .service(StockInRoute::<SqliteDatabase>::new());
        cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::Data::new(OrderFlowApi::new(db.clone(), gateway, producers.clone())))
            .app_data(web::Data::new(ReconciliationApi::new(db.clone(), producers)))
            .app_data(web::Data::new(OrderQueryApi::new(db.clone())))
            .app_data(web::Data::new(InventoryApi::new(db)))
            .app_data(web::Data::new(options))
            .service(api_scope)
            .service(PaymentWebhookRoute::<SqliteDatabase>::new());
    }
}

/// Sends the request and returns the status with the body parsed as JSON (`Null` if it isn't).
pub async fn call<S, B>(app: &S, req: TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn checkout(user: &str, merchant_id: i64, items: &[(i64, i64)], key: &str) -> TestRequest {
    let body = CreateOrderRequest {
        merchant_id,
        items: items.iter().map(|&(p, q)| CartItem::new(p, q)).collect(),
        idempotency_key: key.to_string(),
    };
    TestRequest::post().uri("/api/orders").insert_header(("X-User-Id", user)).set_json(body)
}
