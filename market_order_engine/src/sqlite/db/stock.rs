//! The stock ledger.
//!
//! Every function here performs an aggregate change on `products.quantity` and, only if that change was applied,
//! appends the matching `stock_movements` row. Both statements run on the caller's connection, so inside a transaction
//! they commit or roll back together with whatever else the caller did.
use log::{debug, trace};
use sqlx::SqliteConnection;

use super::products;
use crate::{
    db_types::{MovementType, StockMovement, StockReference},
    traits::StockLedgerError,
};

pub async fn add_stock_in(
    product_id: i64,
    quantity: i64,
    reference: StockReference,
    conn: &mut SqliteConnection,
) -> Result<StockMovement, StockLedgerError> {
    check_quantity(quantity)?;
    let result =
        sqlx::query("UPDATE products SET quantity = quantity + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(quantity)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StockLedgerError::ProductNotFound(product_id));
    }
    let movement = record_movement(product_id, MovementType::In, quantity, reference, conn).await?;
    debug!("📦️ {quantity} units of product #{product_id} received");
    Ok(movement)
}

pub async fn add_stock_out(
    product_id: i64,
    quantity: i64,
    reference: StockReference,
    conn: &mut SqliteConnection,
) -> Result<StockMovement, StockLedgerError> {
    decrement(product_id, MovementType::Out, quantity, reference, conn).await
}

pub async fn add_stock_sale(
    product_id: i64,
    quantity: i64,
    reference: StockReference,
    conn: &mut SqliteConnection,
) -> Result<StockMovement, StockLedgerError> {
    decrement(product_id, MovementType::Sale, quantity, reference, conn).await
}

pub async fn fetch_movements_for_product(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<StockMovement>, sqlx::Error> {
    let movements = sqlx::query_as("SELECT * FROM stock_movements WHERE product_id = $1 ORDER BY id ASC")
        .bind(product_id)
        .fetch_all(conn)
        .await?;
    Ok(movements)
}

async fn decrement(
    product_id: i64,
    movement_type: MovementType,
    quantity: i64,
    reference: StockReference,
    conn: &mut SqliteConnection,
) -> Result<StockMovement, StockLedgerError> {
    check_quantity(quantity)?;
    let result = sqlx::query(
        r#"
        UPDATE products SET quantity = quantity - $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND quantity >= $1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return match products::fetch_product(product_id, conn).await? {
            None => Err(StockLedgerError::ProductNotFound(product_id)),
            Some(p) => {
                trace!("📦️ Product #{product_id} has {} units, {quantity} requested", p.quantity);
                Err(StockLedgerError::InsufficientStock { product_id, requested: quantity })
            },
        };
    }
    let movement = record_movement(product_id, movement_type, quantity, reference, conn).await?;
    debug!("📦️ {quantity} units of product #{product_id} removed ({movement_type})");
    Ok(movement)
}

async fn record_movement(
    product_id: i64,
    movement_type: MovementType,
    quantity: i64,
    reference: StockReference,
    conn: &mut SqliteConnection,
) -> Result<StockMovement, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO stock_movements (product_id, movement_type, quantity, reference_id, reference_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
        "#,
    )
    .bind(product_id)
    .bind(movement_type)
    .bind(quantity)
    .bind(reference.reference_id)
    .bind(reference.reference_type)
    .fetch_one(conn)
    .await
}

fn check_quantity(quantity: i64) -> Result<(), StockLedgerError> {
    if quantity <= 0 {
        return Err(StockLedgerError::InvalidQuantity(quantity));
    }
    Ok(())
}
