use std::{collections::HashMap, fmt::Debug};

use cucumber::World;
use market_order_engine::db_types::Product;

use crate::support::TestSystem;

#[derive(Default, World)]
pub struct MarketWorld {
    pub system: Option<TestSystem>,
    pub products: HashMap<String, Product>,
}

impl Debug for MarketWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MarketWorld ({} products)", self.products.len())
    }
}

impl MarketWorld {
    pub fn system(&self) -> &TestSystem {
        self.system.as_ref().expect("Marketplace not initialised")
    }

    pub fn product(&self, name: &str) -> &Product {
        self.products.get(name).unwrap_or_else(|| panic!("Unknown product {name}"))
    }
}
