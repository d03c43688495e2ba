use std::path::Path;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{
    db_types::{Money, NewProduct, Product, StockReference},
    sqlite::db::products,
    traits::StockLedger,
    SqliteDatabase,
};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

/// A fresh database file under the system temp directory.
pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("mos_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        trace!("Could not drop database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Creates a product and brings its stock up to `quantity` through the ledger, so that the ledger and the on-hand
/// quantity agree from the start.
pub async fn seed_product(db: &SqliteDatabase, merchant_id: i64, name: &str, price: &str, quantity: i64) -> Product {
    let price = price.parse::<Money>().expect("Invalid price");
    let mut conn = db.pool().acquire().await.expect("Error acquiring connection");
    let product = products::insert_product(NewProduct::new(merchant_id, name, price), &mut conn)
        .await
        .expect("Error inserting product");
    if quantity > 0 {
        db.add_stock_in(product.id, quantity, StockReference::new("SEED", "test"))
            .await
            .expect("Error adding initial stock");
    }
    products::fetch_product(product.id, &mut conn).await.expect("Error fetching product").expect("Product vanished")
}
