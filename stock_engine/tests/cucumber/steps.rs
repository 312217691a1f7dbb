use std::time::Duration;

use cucumber::{then, when};
use stock_engine::{
    reconciler::Action,
    stock_types::NotificationHandle,
    test_utils::prepare_env::product,
    traits::ChannelError,
    Delivery,
    EditOutcome,
    TrackMode,
};

use crate::cucumber::StockWorld;

fn channel_error(kind: &str, secs: u64) -> ChannelError {
    match kind {
        "rate limit" => ChannelError::RateLimited { retry_after: Duration::from_secs(secs) },
        "timeout" => ChannelError::TransientTransport("operation timed out".into()),
        "target gone" => ChannelError::TargetGone,
        "not modified" => ChannelError::NoopSuccess,
        "rejection" => ChannelError::PermanentRejection("Bad Request".into()),
        _ => panic!("Unknown channel error {kind}"),
    }
}

#[when(expr = "the channel answers the next send with a {string} of {int}s")]
async fn script_send_error(world: &mut StockWorld, kind: String, secs: u64) {
    world.system().await.channel.script_send(Err(channel_error(&kind, secs)));
}

#[when(expr = "the channel answers the next send with a {string}")]
async fn script_send(world: &mut StockWorld, kind: String) {
    world.system().await.channel.script_send(Err(channel_error(&kind, 0)));
}

#[when(expr = "the channel answers the next edit with {string}")]
async fn script_edit(world: &mut StockWorld, kind: String) {
    world.system().await.channel.script_edit(Err(channel_error(&kind, 0)));
}

async fn observe(world: &mut StockWorld, name: &str, quantity: u64, mode: TrackMode) {
    let settings = world.settings.clone();
    let start = world.start_timer();
    let outcome = world
        .system()
        .await
        .tracker
        .track(&product(name, quantity), &settings, mode)
        .await
        .expect("Error tracking product");
    world.elapsed = start.elapsed();
    world.outcomes.push(outcome);
}

#[when(expr = "'{word}' is observed with quantity {int}")]
async fn observed(world: &mut StockWorld, name: String, quantity: u64) {
    observe(world, &name, quantity, TrackMode::Normal).await;
}

#[when(expr = "'{word}' is observed with quantity {int} on a cold start")]
async fn observed_cold(world: &mut StockWorld, name: String, quantity: u64) {
    observe(world, &name, quantity, TrackMode::ColdStart).await;
}

#[then(expr = "the action is {string}")]
async fn check_action(world: &mut StockWorld, expected: String) {
    let action = world.last_outcome().action;
    match expected.as_str() {
        "Create" => assert_eq!(action, Action::Create),
        "Edit" => assert!(action.is_edit(), "Expected an edit but got {action}"),
        "SilentUpdate" => assert_eq!(action, Action::SilentUpdate),
        "Noop" => assert_eq!(action, Action::Noop),
        _ => panic!("Unknown action {expected}"),
    }
}

#[then(expr = "the delivery is {string}")]
async fn check_delivery(world: &mut StockWorld, expected: String) {
    let delivery = &world.last_outcome().delivery;
    match expected.as_str() {
        "created" => assert!(matches!(delivery, Delivery::Created(_)), "Delivery was {delivery}"),
        "edited" => assert_eq!(delivery, &Delivery::Edited(EditOutcome::Applied)),
        "already current" => assert_eq!(delivery, &Delivery::Edited(EditOutcome::NoopAlreadyCurrent)),
        "skipped" => assert_eq!(delivery, &Delivery::Skipped),
        "undelivered" => assert!(matches!(delivery, Delivery::Undelivered(_)), "Delivery was {delivery}"),
        _ => panic!("Unknown delivery {expected}"),
    }
}

#[then(expr = "the snapshot for '{word}' has quantity {int} and notification #{int}")]
async fn check_snapshot(world: &mut StockWorld, name: String, quantity: u64, handle: i64) {
    let snapshot = world.system().await.tracker.snapshot(&name).await.expect("No snapshot for {name}");
    assert_eq!(snapshot.quantity, quantity, "Quantity is incorrect");
    assert_eq!(snapshot.notification_handle, Some(NotificationHandle(handle)), "Handle is incorrect");
}

#[then(expr = "the snapshot for '{word}' has quantity {int} and no notification")]
async fn check_snapshot_without_handle(world: &mut StockWorld, name: String, quantity: u64) {
    let snapshot = world.system().await.tracker.snapshot(&name).await.expect("No snapshot for {name}");
    assert_eq!(snapshot.quantity, quantity, "Quantity is incorrect");
    assert_eq!(snapshot.notification_handle, None, "Handle is incorrect");
}

#[then(expr = "the snapshot for '{word}' has remark {string}")]
async fn check_remark(world: &mut StockWorld, name: String, remark: String) {
    let snapshot = world.system().await.tracker.snapshot(&name).await.expect("No snapshot for {name}");
    assert_eq!(snapshot.remark, remark, "Remark is incorrect");
}

#[then(expr = "the snapshot for '{word}' was persisted")]
async fn check_persisted(world: &mut StockWorld, name: String) {
    let system = world.system().await;
    let persisted = system.store.persisted().expect("Nothing was persisted");
    let in_memory = system.tracker.snapshot(&name).await;
    assert_eq!(persisted.get(&name), in_memory.as_ref(), "Persisted snapshot differs");
}

#[then(expr = "{int} message(s) was/were sent")]
async fn check_sends(world: &mut StockWorld, count: usize) {
    assert_eq!(world.channel().sends().len(), count, "Send count is incorrect");
}

#[then(expr = "{int} edit(s) was/were attempted")]
async fn check_edits(world: &mut StockWorld, count: usize) {
    assert_eq!(world.channel().edits().len(), count, "Edit count is incorrect");
}

#[then("the channel was never used")]
async fn check_no_calls(world: &mut StockWorld) {
    assert!(world.channel().calls().is_empty(), "Unexpected calls: {:?}", world.channel().calls());
}

#[then(expr = "tracking took at least {int}s")]
async fn check_elapsed(world: &mut StockWorld, secs: u64) {
    assert!(world.elapsed >= Duration::from_secs(secs), "Only took {:?}", world.elapsed);
}
