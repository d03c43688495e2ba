use std::fmt::Debug;

use chrono::Duration;

use crate::{
    db_types::{Order, OrderId},
    moe_api::{errors::OrderFlowError, order_objects::OrderDetail},
    traits::{OrderPage, OrderQueries, Pagination},
};

/// Read-only access to orders and their history.
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderQueries
{
    pub async fn order_detail(&self, order_id: &OrderId) -> Result<OrderDetail, OrderFlowError> {
        let (order, items) = self
            .db
            .fetch_order_detail(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order {order_id}")))?;
        Ok(OrderDetail { order, items })
    }

    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        Ok(orders)
    }

    pub async fn orders_for_merchant(
        &self,
        merchant_id: i64,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<OrderPage, OrderFlowError> {
        let page = self.db.fetch_orders_for_merchant(merchant_id, Pagination::new(page, limit)).await?;
        Ok(page)
    }

    pub async fn orphaned_orders(&self, min_age: Duration) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orphaned_orders(min_age).await?;
        Ok(orders)
    }
}
