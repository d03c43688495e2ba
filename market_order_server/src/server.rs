use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use futures::FutureExt;
use log::*;
use market_order_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    InventoryApi,
    OrderFlowApi,
    OrderQueryApi,
    ReconciliationApi,
    SqliteDatabase,
};
use snap_tools::SnapApi;

use crate::{
    config::{ServerConfig, UserIdHeader},
    errors::ServerError,
    helpers::json_error_handler,
    orphan_monitor::start_orphan_monitor,
    routes::{
        health,
        CreateOrderRoute,
        MerchantOrdersRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        ResumeOrderRoute,
        StockInRoute,
    },
    webhook_routes::PaymentWebhookRoute,
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate the database. {e}")))?;
    let gateway = SnapApi::new(config.snap.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let _monitor = start_orphan_monitor(db.clone(), config.orphan_check_interval, config.orphan_age);
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: SnapApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let bind_addr = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone(), producers.clone());
        let reconciliation_api = ReconciliationApi::new(db.clone(), producers.clone());
        let query_api = OrderQueryApi::new(db.clone());
        let inventory_api = InventoryApi::new(db.clone());
        let api_scope = web::scope("/api")
            .app_data(web::Data::new(UserIdHeader(config.user_id_header.clone())))
            .service(CreateOrderRoute::<SqliteDatabase, SnapApi>::new())
            .service(ResumeOrderRoute::<SqliteDatabase, SnapApi>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(MerchantOrdersRoute::<SqliteDatabase>::new())
            .service(StockInRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mos::access_log"))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(inventory_api))
            .app_data(web::Data::new(config.webhook_options()))
            .service(health)
            .service(api_scope)
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((bind_addr.0.as_str(), bind_addr.1))?
    .run();
    Ok(srv)
}

/// Subscribers that write order lifecycle events to the log.
pub fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            async move {
                let order = &ev.order;
                info!("📬️ Order {} created for {} ({})", order.order_id, order.user_id, order.total_amount);
            }
            .boxed()
        })
        .on_order_paid(|ev| {
            async move {
                let payment_type = ev.order.payment_type.as_deref().unwrap_or("unknown");
                info!("📬️ Order {} paid via {payment_type}", ev.order.order_id);
            }
            .boxed()
        })
        .on_order_failed(|ev| {
            async move {
                info!("📬️ Order {} failed. Provider status: {}", ev.order.order_id, ev.provider_status);
            }
            .boxed()
        });
    hooks
}
