use std::{
    collections::{BTreeSet, HashMap},
    fmt::Debug,
};

use log::*;
use market_common::Money;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, Product},
    events::{EventProducers, OrderCreatedEvent},
    moe_api::{
        errors::OrderFlowError,
        order_objects::{CartItem, CreateOrderRequest, OrderResponse},
    },
    traits::{
        OrderManagement,
        OrderStoreError,
        PaymentGateway,
        ProductCatalog,
        SessionLineItem,
        SessionOutcome,
        SessionRequest,
    },
};

const MAX_ORDER_ID_ATTEMPTS: usize = 3;

/// `OrderFlowApi` turns a cart into a durable order and obtains its payment session.
///
/// The idempotency key is the client's handle on a checkout attempt. The first successful request with a given key
/// creates the order; every later request with the same key gets the same order back, without touching the database
/// or the gateway again.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: OrderManagement + ProductCatalog,
    G: PaymentGateway,
{
    /// Creates an order for `user_id` and opens a payment session for it.
    ///
    /// The steps are:
    /// 1. The idempotency key must be present. If an order already holds it, that order is replayed (see
    ///    [`Self::resume_order`]) and the rest of the request is ignored.
    /// 2. The cart is validated and priced against the catalog. Every product must exist and belong to the merchant.
    /// 3. The order and its items are committed in one transaction.
    /// 4. The payment gateway is asked for a session, which is then stored on the order.
    ///
    /// If step 4 fails the order stays `PENDING` without a session. It is not retried; the caller gets a
    /// [`OrderFlowError::GatewayError`] and later retries with the same key hit an [`OrderFlowError::IntegrityError`].
    pub async fn create_order(
        &self,
        user_id: &str,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, OrderFlowError> {
        let CreateOrderRequest { merchant_id, items, idempotency_key } = request;
        if idempotency_key.trim().is_empty() {
            return Err(OrderFlowError::ValidationError("idempotency key is required".into()));
        }
        if let Some(existing) = self.db.fetch_order_by_idempotency_key(&idempotency_key).await? {
            let existing_id = &existing.order_id;
            debug!("🔄️ Idempotency key {idempotency_key} already belongs to order {existing_id}. Replaying.");
            return replay(&existing);
        }
        validate_cart(&items)?;
        let products = self.resolve_products(merchant_id, &items).await?;
        let order_items = items
            .iter()
            .map(|item| {
                let product = &products[&item.product_id];
                NewOrderItem::new(item.product_id, item.quantity, product.price).ok_or_else(|| {
                    OrderFlowError::ValidationError(format!(
                        "subtotal for product {} is too large ({} x {})",
                        item.product_id, item.quantity, product.price
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total_amount = order_items
            .iter()
            .try_fold(Money::zero(), |total, i| total.checked_add(i.subtotal))
            .ok_or_else(|| OrderFlowError::ValidationError("order total is too large".into()))?;
        if !total_amount.is_positive() {
            return Err(OrderFlowError::ValidationError(format!("order total must be positive, got {total_amount}")));
        }
        let new_order = NewOrder {
            order_id: OrderId::generate(),
            idempotency_key: idempotency_key.clone(),
            user_id: user_id.to_string(),
            merchant_id,
            total_amount,
            items: order_items,
        };
        let order = match self.insert_with_fresh_order_id(new_order).await {
            Ok(order) => order,
            Err(OrderStoreError::IdempotencyConflict(key)) => {
                warn!("🔄️ Lost an idempotency race for key {key}. Returning the winning order instead.");
                let existing = self.db.fetch_order_by_idempotency_key(&key).await?.ok_or_else(|| {
                    OrderFlowError::IntegrityError(format!("idempotency key {key} conflicted but no order holds it"))
                })?;
                return replay(&existing);
            },
            Err(e) => return Err(e.into()),
        };
        info!("🔄️ Order {} created for user {user_id} with total {}", order.order_id, order.total_amount);
        self.producers.publish_order_created(OrderCreatedEvent::new(order.clone())).await;
        let line_items = items
            .iter()
            .map(|item| {
                let product = &products[&item.product_id];
                SessionLineItem {
                    id: product.id.to_string(),
                    name: product.name.clone(),
                    unit_price: product.price,
                    quantity: item.quantity,
                }
            })
            .collect();
        self.open_payment_session(order, line_items).await
    }

    /// Returns the stored response for an idempotency key.
    ///
    /// * [`OrderFlowError::NotFound`] if no order holds the key.
    /// * [`OrderFlowError::IntegrityError`] if the order exists but never received a payment session.
    pub async fn resume_order(&self, idempotency_key: &str) -> Result<OrderResponse, OrderFlowError> {
        if idempotency_key.trim().is_empty() {
            return Err(OrderFlowError::ValidationError("idempotency key is required".into()));
        }
        let order = self
            .db
            .fetch_order_by_idempotency_key(idempotency_key)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order with idempotency key {idempotency_key}")))?;
        replay(&order)
    }

    /// Fetches every referenced product once and checks that the set of products found is exactly the set requested,
    /// and that all of them belong to `merchant_id`.
    async fn resolve_products(
        &self,
        merchant_id: i64,
        items: &[CartItem],
    ) -> Result<HashMap<i64, Product>, OrderFlowError> {
        let requested = items.iter().map(|i| i.product_id).collect::<BTreeSet<_>>();
        let ids = requested.iter().copied().collect::<Vec<_>>();
        let products = self.db.fetch_products(&ids).await?;
        let found = products.iter().map(|p| p.id).collect::<BTreeSet<_>>();
        if found != requested {
            let missing = requested.difference(&found).map(|id| id.to_string()).collect::<Vec<_>>().join(", ");
            return Err(OrderFlowError::ValidationError(format!("unknown product(s): {missing}")));
        }
        if let Some(p) = products.iter().find(|p| p.merchant_id != merchant_id) {
            return Err(OrderFlowError::ValidationError(format!(
                "product {} does not belong to merchant {merchant_id}",
                p.id
            )));
        }
        if let Some(p) = products.iter().find(|p| !p.price.is_positive()) {
            return Err(OrderFlowError::ValidationError(format!("product {} has no valid price", p.id)));
        }
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    /// The generated order id is only probabilistically unique. On the (unlikely) collision a new id is drawn.
    async fn insert_with_fresh_order_id(&self, mut order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut attempt = 1;
        loop {
            match self.db.insert_order(order.clone()).await {
                Err(OrderStoreError::OrderIdCollision(id)) if attempt < MAX_ORDER_ID_ATTEMPTS => {
                    warn!("🔄️ Generated order id {id} is already taken. Drawing another one.");
                    order.order_id = OrderId::generate();
                    attempt += 1;
                },
                result => return result,
            }
        }
    }

    async fn open_payment_session(
        &self,
        order: Order,
        line_items: Vec<SessionLineItem>,
    ) -> Result<OrderResponse, OrderFlowError> {
        let request =
            SessionRequest { order_id: order.order_id.clone(), gross_amount: order.total_amount, line_items };
        let session = match self.gateway.create_session(request).await {
            SessionOutcome::Created { session, advisory } => {
                if let Some(advisory) = advisory {
                    warn!("🔄️ Payment session for {} created with a warning: {advisory}", order.order_id);
                }
                session
            },
            SessionOutcome::NoSession => {
                let order_id = &order.order_id;
                error!("🔄️ The payment gateway returned no session for order {order_id}. It is now orphaned.");
                return Err(OrderFlowError::GatewayError("the payment gateway did not return a session".into()));
            },
            SessionOutcome::TransportError(detail) => {
                error!("🔄️ Could not reach the payment gateway for order {}: {detail}", order.order_id);
                return Err(OrderFlowError::GatewayError(detail));
            },
        };
        let order = self.db.attach_payment_session(&order.order_id, &session).await?;
        debug!("🔄️ Payment session attached to order {}", order.order_id);
        replay(&order)
    }
}

fn validate_cart(items: &[CartItem]) -> Result<(), OrderFlowError> {
    if items.is_empty() {
        return Err(OrderFlowError::ValidationError("an order needs at least one item".into()));
    }
    if let Some(item) = items.iter().find(|i| i.quantity <= 0) {
        return Err(OrderFlowError::ValidationError(format!(
            "quantity for product {} must be positive, got {}",
            item.product_id, item.quantity
        )));
    }
    Ok(())
}

fn replay(order: &Order) -> Result<OrderResponse, OrderFlowError> {
    OrderResponse::for_order(order).ok_or_else(|| {
        OrderFlowError::IntegrityError(format!(
            "order {} exists but never received a payment session",
            order.order_id
        ))
    })
}
