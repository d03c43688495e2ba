use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderId, OrderItemDetail},
    traits::OrderStoreError,
};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// 1-based page selection. Out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

/// Read models over orders. None of these methods mutate state.
#[allow(async_fn_in_trait)]
pub trait OrderQueries {
    /// The order with its items, each joined with the product name.
    async fn fetch_order_detail(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<(Order, Vec<OrderItemDetail>)>, OrderStoreError>;

    /// All of a user's orders, newest first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderStoreError>;

    /// A page of a merchant's orders, newest first, together with the merchant's total order count.
    async fn fetch_orders_for_merchant(
        &self,
        merchant_id: i64,
        pagination: Pagination,
    ) -> Result<OrderPage, OrderStoreError>;

    /// `PENDING` orders without a payment session that were created more than `min_age` ago.
    async fn fetch_orphaned_orders(&self, min_age: Duration) -> Result<Vec<Order>, OrderStoreError>;
}
