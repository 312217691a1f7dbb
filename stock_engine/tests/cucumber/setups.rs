use cucumber::given;
use stock_engine::{
    stock_types::{NotificationHandle, ProductSettings, ProductSnapshot},
    test_utils::prepare_env::{prepare_test_env, quiet_dispatch_config},
};

use crate::cucumber::StockWorld;

#[given("a fresh install")]
async fn fresh_install(world: &mut StockWorld) {
    prepare_test_env();
    world.settings = ProductSettings::new(true, "");
}

#[given(expr = "'{word}' was last seen with quantity {int}")]
async fn last_seen(world: &mut StockWorld, name: String, quantity: u64) {
    let snapshot = ProductSnapshot::first_sight(quantity, &ProductSettings::new(true, ""));
    world.add_snapshot(&name, snapshot);
}

#[given(expr = "'{word}' was last seen with quantity {int} and notification #{int}")]
async fn last_seen_with_handle(world: &mut StockWorld, name: String, quantity: u64, handle: i64) {
    let mut snapshot = ProductSnapshot::first_sight(quantity, &ProductSettings::new(true, ""));
    snapshot.notification_handle = Some(NotificationHandle(handle));
    world.add_snapshot(&name, snapshot);
}

#[given(expr = "notifications are disabled with remark {string}")]
async fn notifications_disabled(world: &mut StockWorld, remark: String) {
    world.settings = ProductSettings::new(false, remark);
}

#[given(expr = "the dispatcher has a retry budget of {int}")]
async fn retry_budget(world: &mut StockWorld, budget: u32) {
    let config = world.dispatch_config.take().unwrap_or_else(quiet_dispatch_config);
    world.dispatch_config = Some(config.with_retry_budget(budget));
}
