use thiserror::Error;

use crate::db_types::Product;

/// Read-only access to the catalog owned by the product service.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    /// Fetches every product whose id appears in `ids`. Unknown ids are simply absent from the result; duplicates in
    /// `ids` are returned once.
    async fn fetch_products(&self, ids: &[i64]) -> Result<Vec<Product>, CatalogError>;

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
