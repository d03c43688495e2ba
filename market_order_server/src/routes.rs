//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a few lines MUST go into a separate module.
//!
//! Every handler is async. Each worker thread processes its requests sequentially, so anything that blocks the thread
//! (rather than awaiting) stalls every other request on that worker.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use market_order_engine::{
    db_types::OrderId,
    order_objects::CreateOrderRequest,
    traits::{MarketplaceDatabase, OrderQueries, PaymentGateway},
    InventoryApi,
    OrderFlowApi,
    OrderQueryApi,
};

use crate::{
    data_objects::{PageParams, StockInRequest},
    errors::ServerError,
    helpers::UserId,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! {
            pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >(
                $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+
            );
        }
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory
            for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(create_order => Post "/orders" impl MarketplaceDatabase, PaymentGateway);
/// Route handler for checkout.
///
/// The body is a [`CreateOrderRequest`]. The response carries the order id with the payment session token and
/// redirect url. Repeating the request with the same `idempotency_key` returns the same order without creating
/// another one.
pub async fn create_order<B, G>(
    user: UserId,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase,
    G: PaymentGateway,
{
    let request = body.into_inner();
    debug!("💻️ POST create_order for {} (key {})", user.as_str(), request.idempotency_key);
    let response = api.create_order(user.as_str(), request).await.map_err(|e| {
        debug!("💻️ Could not create order. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(response))
}

route!(resume_order => Post "/orders/resume/{idempotency_key}" impl MarketplaceDatabase, PaymentGateway);
/// Returns the payment session of an existing order, identified by its idempotency key.
pub async fn resume_order<B, G>(
    user: UserId,
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase,
    G: PaymentGateway,
{
    let key = path.into_inner();
    debug!("💻️ POST resume_order for {} (key {key})", user.as_str());
    let response = api.resume_order(&key).await?;
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl OrderQueries);
/// The caller's orders, newest first.
pub async fn my_orders<B: OrderQueries>(
    user: UserId,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {}", user.as_str());
    let orders = api.orders_for_user(user.as_str()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderQueries);
/// An order with its items. Users only see their own orders; anyone else's order id is reported as not found,
/// whether it exists or not.
pub async fn order_by_id<B: OrderQueries>(
    user: UserId,
    path: web::Path<OrderId>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order_by_id({order_id}) for {}", user.as_str());
    let detail = api.order_detail(&order_id).await?;
    if detail.order.user_id != user.as_str() {
        return Err(ServerError::NoRecordFound(format!("Order {order_id} does not exist")));
    }
    Ok(HttpResponse::Ok().json(detail))
}

route!(merchant_orders => Get "/merchants/{merchant_id}/orders" impl OrderQueries);
/// A page of a merchant's orders, newest first. `page` starts at 1 and `limit` is clamped to 1..=100.
pub async fn merchant_orders<B: OrderQueries>(
    _user: UserId,
    path: web::Path<i64>,
    query: web::Query<PageParams>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let merchant_id = path.into_inner();
    let PageParams { page, limit } = query.into_inner();
    debug!("💻️ GET merchant_orders for merchant #{merchant_id} (page {page:?}, limit {limit:?})");
    let page = api.orders_for_merchant(merchant_id, page, limit).await?;
    Ok(HttpResponse::Ok().json(page))
}

//----------------------------------------------   Inventory  ----------------------------------------------------
route!(stock_in => Post "/stock/in" impl MarketplaceDatabase);
/// Restocks a product and returns the ledger movement that records it.
pub async fn stock_in<B: MarketplaceDatabase>(
    user: UserId,
    body: web::Json<StockInRequest>,
    api: web::Data<InventoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST stock_in by {}: {} units of product #{}", user.as_str(), request.quantity, request.product_id);
    let movement = api.stock_in(request.product_id, request.quantity, request.reference()).await?;
    Ok(HttpResponse::Ok().json(movement))
}
