use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{ledger_balance, StockMovement, StockReference},
    moe_api::errors::OrderFlowError,
    traits::{ProductCatalog, StockLedger},
};

/// The on-hand quantity of a product next to the balance its ledger adds up to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReport {
    pub product_id: i64,
    pub on_hand: i64,
    pub ledger_balance: i64,
    pub movements: Vec<StockMovement>,
}

impl StockReport {
    pub fn is_consistent(&self) -> bool {
        self.on_hand == self.ledger_balance
    }
}

pub struct InventoryApi<B> {
    db: B,
}

impl<B> Debug for InventoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InventoryApi")
    }
}

impl<B> InventoryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> InventoryApi<B>
where B: StockLedger + ProductCatalog
{
    pub async fn stock_in(
        &self,
        product_id: i64,
        quantity: i64,
        reference: StockReference,
    ) -> Result<StockMovement, OrderFlowError> {
        let movement = self.db.add_stock_in(product_id, quantity, reference).await?;
        info!("📦️ Restocked product #{product_id} with {quantity} units");
        Ok(movement)
    }

    pub async fn stock_out(
        &self,
        product_id: i64,
        quantity: i64,
        reference: StockReference,
    ) -> Result<StockMovement, OrderFlowError> {
        let movement = self.db.add_stock_out(product_id, quantity, reference).await?;
        info!("📦️ Removed {quantity} units of product #{product_id}");
        Ok(movement)
    }

    pub async fn stock_movements(&self, product_id: i64) -> Result<Vec<StockMovement>, OrderFlowError> {
        let movements = self.db.fetch_stock_movements(product_id).await?;
        Ok(movements)
    }

    pub async fn stock_report(&self, product_id: i64) -> Result<StockReport, OrderFlowError> {
        let product = self
            .db
            .fetch_product(product_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Product {product_id}")))?;
        let movements = self.db.fetch_stock_movements(product_id).await?;
        let ledger_balance = ledger_balance(&movements);
        let report = StockReport { product_id, on_hand: product.quantity, ledger_balance, movements };
        if !report.is_consistent() {
            warn!(
                "📦️ Product #{product_id} has {} units on hand but its ledger sums to {}",
                report.on_hand, report.ledger_balance
            );
        }
        Ok(report)
    }
}
