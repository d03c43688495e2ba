use log::debug;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{NewProduct, Product};

/// Fetches all products with an id in `ids`. Missing ids are not an error here; the caller compares the result with
/// what it asked for.
pub async fn fetch_products(ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM products WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

/// Products are created by the catalog service. This exists for seeding and tooling; the new product starts with
/// zero stock, and stock is only ever added through the ledger.
pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        r#"
        INSERT INTO products (merchant_id, name, price, quantity) VALUES ($1, $2, $3, 0)
        RETURNING *;
        "#,
    )
    .bind(product.merchant_id)
    .bind(product.name)
    .bind(product.price)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product #{} ({}) created for merchant {}", product.id, product.name, product.merchant_id);
    Ok(product)
}

/// Changes the catalog price. Existing order items keep the price they were created with.
pub async fn update_product_price(
    id: i64,
    price: market_common::Money,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(
        "UPDATE products SET price = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(price)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}
