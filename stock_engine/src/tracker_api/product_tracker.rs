//! `ProductTracker` is the primary API of the engine. Each observed product goes through three steps:
//!
//! 1. The previous snapshot is compared with the observation and an [`Action`] is chosen (see [`crate::reconciler`]).
//! 2. The action is carried out on the messaging channel by the [`Dispatcher`].
//! 3. The new snapshot is stored in memory and the whole mapping is persisted straight away.
//!
//! The snapshot lock is never held while talking to the channel, so products from different sources can be dispatched
//! concurrently. It is held while saving, which keeps the store single-writer.
use std::fmt::Debug;

use log::*;
use tokio::sync::Mutex;

use crate::{
    dispatcher::{Dispatcher, EditOutcome, SendFailure},
    formatting::MessageFormatter,
    reconciler::{decide, Action},
    stock_types::{NotificationHandle, ProductRecord, ProductSettings, ProductSnapshot, SnapshotMap},
    tracker_api::{
        errors::TrackerError,
        tracker_objects::{Delivery, TrackMode, TrackOutcome},
    },
    traits::{MessagingChannel, SnapshotStore},
};

struct Dispatched {
    delivery: Delivery,
    handle: Option<NotificationHandle>,
    /// False when a restock or quantity announcement never reached the channel. The previous quantity is then kept, so
    /// that the same transition is detected (and the announcement retried) next cycle.
    settled: bool,
}

impl Dispatched {
    fn skipped(handle: Option<NotificationHandle>) -> Self {
        Self { delivery: Delivery::Skipped, handle, settled: true }
    }

    fn edited(outcome: EditOutcome, handle: NotificationHandle) -> Self {
        Self { delivery: Delivery::Edited(outcome), handle: Some(handle), settled: true }
    }
}

pub struct ProductTracker<S, C> {
    store: S,
    snapshots: Mutex<SnapshotMap>,
    dispatcher: Dispatcher<C>,
    formatter: MessageFormatter,
}

impl<S, C> Debug for ProductTracker<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProductTracker")
    }
}

impl<S, C> ProductTracker<S, C>
where
    S: SnapshotStore,
    C: MessagingChannel,
{
    /// Create a tracker, loading the persisted snapshots from `store`.
    pub async fn load(store: S, dispatcher: Dispatcher<C>, formatter: MessageFormatter) -> Result<Self, TrackerError> {
        let snapshots = store.load().await?;
        info!("📦️ Tracking {} known products", snapshots.len());
        Ok(Self { store, snapshots: Mutex::new(snapshots), dispatcher, formatter })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn snapshot(&self, name: &str) -> Option<ProductSnapshot> {
        self.snapshots.lock().await.get(name).cloned()
    }

    /// Reconcile an observed product against its snapshot, notify the subscriber if warranted and persist the result.
    ///
    /// Messaging problems are never errors: they are logged and reflected in the returned [`Delivery`]. An error is
    /// only returned when the snapshots could not be persisted, in which case the in-memory state has still been
    /// updated and will be written by the next successful save.
    pub async fn track(
        &self,
        record: &ProductRecord,
        settings: &ProductSettings,
        mode: TrackMode,
    ) -> Result<TrackOutcome, TrackerError> {
        let name = record.name.as_str();
        let previous = self.snapshot(name).await;
        let action = match mode {
            TrackMode::ColdStart => Action::SilentUpdate,
            TrackMode::Normal => decide(previous.as_ref(), record.quantity, settings),
        };
        debug!(
            "📦️ [{name}] {} -> {} ({action})",
            previous.as_ref().map(|p| p.quantity.to_string()).unwrap_or_else(|| "new".to_string()),
            record.quantity
        );
        let previous_handle = previous.as_ref().and_then(|p| p.notification_handle);
        let dispatched = match action {
            Action::SilentUpdate | Action::Noop => Dispatched::skipped(previous_handle),
            _ => {
                let body = self.formatter.render(record, &settings.remark);
                self.dispatch(name, action, &body, previous_handle).await
            },
        };
        let quantity = match (&previous, dispatched.settled) {
            (Some(p), false) => {
                warn!(
                    "📦️ [{name}] The notification could not be delivered. Keeping quantity {} so that it is retried \
                     next cycle.",
                    p.quantity
                );
                p.quantity
            },
            _ => record.quantity,
        };
        let snapshot = ProductSnapshot {
            quantity,
            notification_handle: dispatched.handle,
            notify_enabled: settings.notify_enabled,
            remark: settings.remark.clone(),
        };
        self.persist(name, snapshot.clone()).await?;
        Ok(TrackOutcome { action, delivery: dispatched.delivery, snapshot })
    }

    async fn dispatch(
        &self,
        name: &str,
        action: Action,
        body: &str,
        previous_handle: Option<NotificationHandle>,
    ) -> Dispatched {
        match action {
            Action::Create => self.announce(name, body, previous_handle).await,
            Action::Edit(handle) => match self.dispatcher.edit(name, handle, body).await {
                // Sold-out notices are never retried, so the observed quantity is recorded even if this send fails
                EditOutcome::TargetMissing => Dispatched { settled: true, ..self.announce(name, body, None).await },
                outcome => Dispatched::edited(outcome, handle),
            },
            Action::EditThenFallbackToCreate(handle) => match self.dispatcher.edit(name, handle, body).await {
                EditOutcome::TargetMissing => self.announce(name, body, None).await,
                EditOutcome::Failed(e) => {
                    info!("📦️ [{name}] Could not edit {handle} ({e}). Sending a new notification instead.");
                    self.announce(name, body, Some(handle)).await
                },
                outcome => Dispatched::edited(outcome, handle),
            },
            Action::SilentUpdate | Action::Noop => Dispatched::skipped(previous_handle),
        }
    }

    /// Send a fresh notification. If nothing new is sent, the snapshot falls back to `fallback_handle`.
    async fn announce(&self, name: &str, body: &str, fallback_handle: Option<NotificationHandle>) -> Dispatched {
        match self.dispatcher.send(name, body).await {
            Ok(handle) => Dispatched { delivery: Delivery::Created(handle), handle: Some(handle), settled: true },
            Err(SendFailure::DuplicateDetected) => {
                Dispatched { delivery: Delivery::Duplicate, handle: fallback_handle, settled: true }
            },
            Err(e) => Dispatched { delivery: Delivery::Undelivered(e), handle: fallback_handle, settled: false },
        }
    }

    async fn persist(&self, name: &str, snapshot: ProductSnapshot) -> Result<(), TrackerError> {
        let mut snapshots = self.snapshots.lock().await;
        snapshots.insert(name.to_string(), snapshot);
        self.store.save(&snapshots).await.map_err(|e| {
            error!("📦️ [{name}] Could not save snapshots. {e}");
            TrackerError::from(e)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dispatcher::DispatchConfig,
        test_utils::{
            memory_store::MemoryStore,
            prepare_env::{prepare_test_env, product, quiet_dispatch_config},
            scripted_channel::ScriptedChannel,
        },
        traits::ChannelError,
    };

    const NAME: &str = "SLICE 1024";

    fn snapshot(quantity: u64, handle: Option<i64>) -> ProductSnapshot {
        ProductSnapshot {
            quantity,
            notification_handle: handle.map(NotificationHandle),
            notify_enabled: true,
            remark: String::default(),
        }
    }

    async fn tracker_with(
        previous: Option<ProductSnapshot>,
        config: DispatchConfig,
    ) -> (ProductTracker<MemoryStore, ScriptedChannel>, ScriptedChannel, MemoryStore) {
        prepare_test_env();
        let snapshots = previous.map(|p| SnapshotMap::from([(NAME.to_string(), p)])).unwrap_or_default();
        let store = MemoryStore::with_snapshots(snapshots);
        let channel = ScriptedChannel::new();
        let dispatcher = Dispatcher::new(channel.clone(), config);
        let tracker = ProductTracker::load(store.clone(), dispatcher, MessageFormatter::default()).await.unwrap();
        (tracker, channel, store)
    }

    async fn tracker(
        previous: Option<ProductSnapshot>,
    ) -> (ProductTracker<MemoryStore, ScriptedChannel>, ScriptedChannel, MemoryStore) {
        tracker_with(previous, quiet_dispatch_config()).await
    }

    fn notify() -> ProductSettings {
        ProductSettings::new(true, "")
    }

    #[tokio::test]
    async fn restock_sends_and_records_the_handle() {
        let (tracker, channel, store) = tracker(Some(snapshot(0, None))).await;
        let outcome = tracker.track(&product(NAME, 5), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.action, Action::Create);
        assert_eq!(outcome.delivery, Delivery::Created(NotificationHandle(1001)));
        assert_eq!(outcome.snapshot, snapshot(5, Some(1001)));
        assert_eq!(channel.sends().len(), 1);
        assert_eq!(store.persisted().unwrap()[NAME], snapshot(5, Some(1001)));
    }

    #[tokio::test]
    async fn sold_out_edit_falls_back_to_send_when_the_message_is_gone() {
        let (tracker, channel, _) = tracker(Some(snapshot(5, Some(42)))).await;
        channel.script_edit(Err(ChannelError::TargetGone));
        let outcome = tracker.track(&product(NAME, 0), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.action, Action::Edit(NotificationHandle(42)));
        assert_eq!(outcome.delivery, Delivery::Created(NotificationHandle(1001)));
        assert_eq!(outcome.snapshot, snapshot(0, Some(1001)));
        assert_eq!(channel.edits().len(), 1);
        assert_eq!(channel.sends().len(), 1);
    }

    #[tokio::test]
    async fn sold_out_edit_failures_keep_the_handle() {
        let (tracker, channel, _) = tracker(Some(snapshot(5, Some(42)))).await;
        channel.script_edit(Err(ChannelError::PermanentRejection("Bad Request".into())));
        let outcome = tracker.track(&product(NAME, 0), &notify(), TrackMode::Normal).await.unwrap();
        assert!(matches!(outcome.delivery, Delivery::Edited(EditOutcome::Failed(_))));
        assert_eq!(outcome.snapshot, snapshot(0, Some(42)));
        assert!(channel.sends().is_empty());
    }

    #[tokio::test]
    async fn failed_sold_out_fallbacks_still_record_the_quantity() {
        let (tracker, channel, store) = tracker(Some(snapshot(5, Some(42)))).await;
        channel.script_edit(Err(ChannelError::TargetGone));
        channel.script_send(Err(ChannelError::PermanentRejection("Forbidden".into())));
        let outcome = tracker.track(&product(NAME, 0), &notify(), TrackMode::Normal).await.unwrap();
        assert!(matches!(outcome.delivery, Delivery::Undelivered(SendFailure::AbortedByChannel(_))));
        assert_eq!(outcome.snapshot, snapshot(0, None));
        assert_eq!(store.persisted().unwrap()[NAME], snapshot(0, None));
        let outcome = tracker.track(&product(NAME, 0), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.action, Action::Noop);
        assert_eq!(channel.sends().len(), 1);
    }

    #[tokio::test]
    async fn quantity_edit_falls_back_to_send_when_the_message_is_gone() {
        let (tracker, channel, _) = tracker(Some(snapshot(5, Some(42)))).await;
        channel.script_edit(Err(ChannelError::TargetGone));
        let outcome = tracker.track(&product(NAME, 3), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.action, Action::EditThenFallbackToCreate(NotificationHandle(42)));
        assert_eq!(outcome.delivery, Delivery::Created(NotificationHandle(1001)));
        assert_eq!(outcome.snapshot, snapshot(3, Some(1001)));
        assert_eq!(channel.edits().len(), 1);
        assert_eq!(channel.sends().len(), 1);
    }

    #[tokio::test]
    async fn undelivered_quantity_fallbacks_are_retried_next_cycle() {
        let (tracker, channel, _) = tracker(Some(snapshot(5, Some(42)))).await;
        channel.script_edit(Err(ChannelError::TargetGone));
        channel.script_send(Err(ChannelError::PermanentRejection("Forbidden".into())));
        let outcome = tracker.track(&product(NAME, 3), &notify(), TrackMode::Normal).await.unwrap();
        assert!(matches!(outcome.delivery, Delivery::Undelivered(_)));
        assert_eq!(outcome.snapshot, snapshot(5, None));
        // With the handle gone, the quantity change is announced as a new message
        let outcome = tracker.track(&product(NAME, 3), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.action, Action::Create);
        assert_eq!(outcome.snapshot, snapshot(3, Some(1001)));
        assert_eq!(channel.sends().len(), 2);
    }

    #[tokio::test]
    async fn unchanged_content_is_a_successful_edit() {
        let (tracker, channel, _) = tracker(Some(snapshot(5, Some(42)))).await;
        channel.script_edit(Err(ChannelError::NoopSuccess));
        let outcome = tracker.track(&product(NAME, 3), &notify(), TrackMode::Normal).await.unwrap();
        assert!(outcome.action.is_edit());
        assert_eq!(outcome.delivery, Delivery::Edited(EditOutcome::NoopAlreadyCurrent));
        assert_eq!(outcome.snapshot, snapshot(3, Some(42)));
        assert!(channel.sends().is_empty());
    }

    #[tokio::test]
    async fn failed_quantity_edits_fall_back_to_a_new_message() {
        let (tracker, channel, _) = tracker(Some(snapshot(5, Some(42)))).await;
        channel.script_edit(Err(ChannelError::PermanentRejection("Bad Request: message can't be edited".into())));
        let outcome = tracker.track(&product(NAME, 3), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.action, Action::EditThenFallbackToCreate(NotificationHandle(42)));
        assert_eq!(outcome.snapshot, snapshot(3, Some(1001)));
    }

    #[tokio::test]
    async fn undelivered_announcements_are_retried_next_cycle() {
        let (tracker, channel, _) = tracker(Some(snapshot(0, None))).await;
        channel.script_send(Err(ChannelError::PermanentRejection("Forbidden".into())));
        let outcome = tracker.track(&product(NAME, 5), &notify(), TrackMode::Normal).await.unwrap();
        assert!(matches!(outcome.delivery, Delivery::Undelivered(SendFailure::AbortedByChannel(_))));
        assert_eq!(outcome.snapshot, snapshot(0, None));
        // Next cycle the restock is seen again
        let outcome = tracker.track(&product(NAME, 5), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.action, Action::Create);
        assert_eq!(outcome.snapshot, snapshot(5, Some(1001)));
        assert_eq!(channel.sends().len(), 2);
    }

    #[tokio::test]
    async fn duplicates_are_not_given_a_handle() {
        let (tracker, channel, _) = tracker_with(Some(snapshot(0, None)), DispatchConfig::default()).await;
        let body = MessageFormatter::default().render(&product(NAME, 5), "");
        channel.set_history(vec![body]);
        let outcome = tracker.track(&product(NAME, 5), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.delivery, Delivery::Duplicate);
        assert_eq!(outcome.snapshot, snapshot(5, None));
        assert!(channel.sends().is_empty());
    }

    #[tokio::test]
    async fn muted_products_are_tracked_silently() {
        let (tracker, channel, store) = tracker(Some(snapshot(0, Some(42)))).await;
        let muted = ProductSettings::new(false, "paused");
        for quantity in [4, 0, 9, 2, 0] {
            let outcome = tracker.track(&product(NAME, quantity), &muted, TrackMode::Normal).await.unwrap();
            assert_eq!(outcome.action, Action::SilentUpdate);
            assert_eq!(outcome.snapshot.quantity, quantity);
            assert_eq!(outcome.snapshot.notification_handle, Some(NotificationHandle(42)));
            assert!(!outcome.snapshot.notify_enabled);
            assert_eq!(outcome.snapshot.remark, "paused");
        }
        assert!(channel.calls().is_empty());
        assert_eq!(store.save_count(), 5);
    }

    #[tokio::test]
    async fn new_products_are_never_announced() {
        let (tracker, channel, store) = tracker(None).await;
        let outcome = tracker.track(&product(NAME, 8), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(outcome.action, Action::SilentUpdate);
        assert_eq!(outcome.snapshot, snapshot(8, None));
        assert!(channel.calls().is_empty());
        assert_eq!(store.persisted().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cold_start_never_messages() {
        let (tracker, channel, _) = tracker(Some(snapshot(0, Some(42)))).await;
        let outcome = tracker.track(&product(NAME, 8), &notify(), TrackMode::ColdStart).await.unwrap();
        assert_eq!(outcome.action, Action::SilentUpdate);
        assert_eq!(outcome.snapshot, snapshot(8, Some(42)));
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn a_second_pass_over_the_same_data_is_a_noop() {
        let (tracker, channel, _) = tracker(Some(snapshot(0, None))).await;
        let first = tracker.track(&product(NAME, 5), &notify(), TrackMode::Normal).await.unwrap();
        let second = tracker.track(&product(NAME, 5), &notify(), TrackMode::Normal).await.unwrap();
        assert_eq!(first.action, Action::Create);
        assert_eq!(second.action, Action::Noop);
        assert_eq!(second.snapshot, first.snapshot);
        assert_eq!(channel.sends().len(), 1);
    }

    #[tokio::test]
    async fn one_live_handle_through_a_restock_cycle() {
        let (tracker, channel, _) = tracker(Some(snapshot(0, None))).await;
        let mut handles = Vec::new();
        for quantity in [3, 2, 0, 0, 6, 6, 1, 0] {
            let outcome = tracker.track(&product(NAME, quantity), &notify(), TrackMode::Normal).await.unwrap();
            handles.push(outcome.snapshot.notification_handle);
        }
        let h = |v| Some(NotificationHandle(v));
        assert_eq!(handles, vec![h(1001), h(1001), h(1001), h(1001), h(1002), h(1002), h(1002), h(1002)]);
        assert_eq!(channel.sends().len(), 2);
        assert_eq!(channel.edits().len(), 4);
    }

    #[tokio::test]
    async fn save_failures_are_reported_but_state_is_kept() {
        let (tracker, _, store) = tracker(Some(snapshot(0, None))).await;
        store.fail_saves(true);
        let err = tracker.track(&product(NAME, 0), &notify(), TrackMode::Normal).await;
        assert!(matches!(err, Err(TrackerError::StoreError(_))));
        assert_eq!(tracker.snapshot(NAME).await, Some(snapshot(0, None)));
    }
}
