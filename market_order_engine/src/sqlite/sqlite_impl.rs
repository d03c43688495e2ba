//! `SqliteDatabase` is a concrete implementation of an order engine backend.
//!
//! It uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use chrono::Duration;
use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, orders, products, stock};
use crate::{
    db_types::{
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        OrderItemDetail,
        OrderStatusType,
        Product,
        StockMovement,
        StockReference,
    },
    traits::{
        CatalogError,
        MarketplaceDatabase,
        OrderManagement,
        OrderPage,
        OrderQueries,
        OrderStoreError,
        Pagination,
        PaymentSession,
        ProductCatalog,
        StockLedger,
        StockLedgerError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_idempotency_key(&self, key: &str) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_idempotency_key(key, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))?;
        let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
        Ok(items)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let item_count = order.items.len();
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] and {item_count} items committed", order.order_id);
        Ok(order)
    }

    async fn attach_payment_session(
        &self,
        order_id: &OrderId,
        session: &PaymentSession,
    ) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::attach_session(order_id, session, &mut conn)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))
    }

    async fn settle_order(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
        payment_type: Option<&str>,
    ) -> Result<Option<Order>, OrderStoreError> {
        if !new_status.is_terminal() {
            return Err(OrderStoreError::InvalidStatusTransition(new_status));
        }
        let mut tx = self.pool.begin().await?;
        let order = match orders::transition_pending_order(order_id, new_status, payment_type, &mut tx).await? {
            Some(order) => order,
            None => {
                debug!("🗃️ Order {order_id} is no longer PENDING. Nothing to settle.");
                return Ok(None);
            },
        };
        if new_status == OrderStatusType::Paid {
            let items = orders::fetch_items_for_order(order.id, &mut tx).await?;
            let reference = StockReference::for_order(order_id);
            for item in items {
                // Any failure here drops `tx` un-committed, which rolls back the status change as well.
                stock::add_stock_sale(item.product_id, item.quantity, reference.clone(), &mut tx).await?;
                trace!("🗃️ Order {order_id}: sold {} x product #{}", item.quantity, item.product_id);
            }
        }
        tx.commit().await?;
        debug!("🗃️ Order {order_id} settled as {new_status}");
        Ok(Some(order))
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn fetch_products(&self, ids: &[i64]) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(ids, &mut conn).await?;
        Ok(products)
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }
}

impl StockLedger for SqliteDatabase {
    async fn add_stock_in(
        &self,
        product_id: i64,
        quantity: i64,
        reference: StockReference,
    ) -> Result<StockMovement, StockLedgerError> {
        let mut tx = self.pool.begin().await?;
        let movement = stock::add_stock_in(product_id, quantity, reference, &mut tx).await?;
        tx.commit().await?;
        Ok(movement)
    }

    async fn add_stock_out(
        &self,
        product_id: i64,
        quantity: i64,
        reference: StockReference,
    ) -> Result<StockMovement, StockLedgerError> {
        let mut tx = self.pool.begin().await?;
        let movement = stock::add_stock_out(product_id, quantity, reference, &mut tx).await?;
        tx.commit().await?;
        Ok(movement)
    }

    async fn add_stock_sale(
        &self,
        product_id: i64,
        quantity: i64,
        reference: StockReference,
    ) -> Result<StockMovement, StockLedgerError> {
        let mut tx = self.pool.begin().await?;
        let movement = stock::add_stock_sale(product_id, quantity, reference, &mut tx).await?;
        tx.commit().await?;
        Ok(movement)
    }

    async fn fetch_stock_movements(&self, product_id: i64) -> Result<Vec<StockMovement>, StockLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let movements = stock::fetch_movements_for_product(product_id, &mut conn).await?;
        Ok(movements)
    }
}

impl OrderQueries for SqliteDatabase {
    async fn fetch_order_detail(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<(Order, Vec<OrderItemDetail>)>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order_by_order_id(order_id, &mut conn).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let items = orders::fetch_item_details_for_order(order.id, &mut conn).await?;
        Ok(Some((order, items)))
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_merchant(
        &self,
        merchant_id: i64,
        pagination: Pagination,
    ) -> Result<OrderPage, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let page = orders::fetch_orders_for_merchant(merchant_id, pagination, &mut conn).await?;
        Ok(page)
    }

    async fn fetch_orphaned_orders(&self, min_age: Duration) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orphaned_orders(min_age, &mut conn).await?;
        Ok(orders)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using `MOS_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
