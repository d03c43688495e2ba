use cucumber::given;
use market_order_engine::test_utils::prepare_env::seed_product;

use crate::{
    cucumber::MarketWorld,
    support::{GatewayMode, TestSystem},
};

#[given("a fresh marketplace")]
async fn fresh_marketplace(world: &mut MarketWorld) {
    world.system = Some(TestSystem::new(GatewayMode::Succeed).await);
}

#[given(expr = "merchant {int} sells {string} for {word} with {int} in stock")]
async fn merchant_sells(world: &mut MarketWorld, merchant_id: i64, name: String, price: String, quantity: i64) {
    let product = seed_product(&world.system().db, merchant_id, &name, &price, quantity).await;
    world.products.insert(name, product);
}
