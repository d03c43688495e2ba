use crate::traits::{OrderManagement, OrderQueries, ProductCatalog, StockLedger};

/// The highest level of behaviour for backends supporting the order engine.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + OrderManagement + ProductCatalog + StockLedger + OrderQueries {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
