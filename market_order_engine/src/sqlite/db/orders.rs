use chrono::Duration;
use log::{debug, trace};
use sqlx::SqliteConnection;

use super::is_unique_violation_on;
use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderItemDetail, OrderStatusType},
    traits::{OrderPage, OrderStoreError, Pagination, PaymentSession},
};

/// Inserts the order header and its items using the given connection. This is not atomic by itself. Pass `&mut tx`
/// from an open transaction to get all-or-nothing behaviour.
///
/// Uniqueness violations on the idempotency key or the external order id are reported as
/// [`OrderStoreError::IdempotencyConflict`] and [`OrderStoreError::OrderIdCollision`] respectively.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    let NewOrder { order_id, idempotency_key, user_id, merchant_id, total_amount, items } = order;
    let result = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (
                order_id,
                idempotency_key,
                user_id,
                merchant_id,
                status,
                total_amount
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(&order_id)
    .bind(&idempotency_key)
    .bind(user_id)
    .bind(merchant_id)
    .bind(OrderStatusType::Pending)
    .bind(total_amount)
    .fetch_one(&mut *conn)
    .await;
    let order = match result {
        Ok(order) => order,
        Err(e) if is_unique_violation_on(&e, "idempotency_key") => {
            return Err(OrderStoreError::IdempotencyConflict(idempotency_key))
        },
        Err(e) if is_unique_violation_on(&e, "order_id") => return Err(OrderStoreError::OrderIdCollision(order_id)),
        Err(e) => return Err(e.into()),
    };
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5);
            "#,
        )
        .bind(order.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.subtotal)
        .execute(&mut *conn)
        .await?;
    }
    debug!("🗃️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_idempotency_key(
    key: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE idempotency_key = $1").bind(key).fetch_optional(conn).await?;
    Ok(order)
}

/// Items for the order with the given internal id, in insertion order.
pub async fn fetch_items_for_order(id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_item_details_for_order(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItemDetail>, sqlx::Error> {
    let items = sqlx::query_as(
        r#"
        SELECT
            order_items.product_id as product_id,
            products.name as product_name,
            order_items.quantity as quantity,
            order_items.unit_price as unit_price,
            order_items.subtotal as subtotal
        FROM order_items JOIN products ON order_items.product_id = products.id
        WHERE order_items.order_id = $1
        ORDER BY order_items.id ASC
        "#,
    )
    .bind(id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

pub async fn attach_session(
    order_id: &OrderId,
    session: &PaymentSession,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET session_token = $1, redirect_url = $2, updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $3
        RETURNING *;
        "#,
    )
    .bind(&session.token)
    .bind(&session.redirect_url)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ Payment session attached to order {order_id}");
    Ok(order)
}

/// Moves a `PENDING` order to `new_status` in one conditional statement. If the order is not `PENDING` at the moment
/// the statement runs, nothing changes and `None` is returned.
pub async fn transition_pending_order(
    order_id: &OrderId,
    new_status: OrderStatusType,
    payment_type: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET status = $1, payment_type = $2, updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $3 AND status = $4
        RETURNING *;
        "#,
    )
    .bind(new_status)
    .bind(payment_type)
    .bind(order_id.as_str())
    .bind(OrderStatusType::Pending)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn fetch_orders_for_merchant(
    merchant_id: i64,
    pagination: Pagination,
    conn: &mut SqliteConnection,
) -> Result<OrderPage, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders WHERE merchant_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(merchant_id)
    .bind(pagination.limit)
    .bind(pagination.offset())
    .fetch_all(&mut *conn)
    .await?;
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE merchant_id = $1")
        .bind(merchant_id)
        .fetch_one(conn)
        .await?;
    Ok(OrderPage { orders, page: pagination.page, limit: pagination.limit, total })
}

/// `PENDING` orders without a complete payment session, created before `now - min_age`.
///
/// Timestamps are stored in SQLite's `CURRENT_TIMESTAMP` format, so the cut-off is computed by SQLite as well.
pub async fn fetch_orphaned_orders(min_age: Duration, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let modifier = format!("-{} seconds", min_age.num_seconds());
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE status = $1
          AND (COALESCE(session_token, '') = '' OR COALESCE(redirect_url, '') = '')
          AND created_at < datetime('now', $2)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(OrderStatusType::Pending)
    .bind(modifier)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
