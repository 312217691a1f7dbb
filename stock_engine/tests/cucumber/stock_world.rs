use cucumber::World;
use log::*;
use stock_engine::{
    stock_types::{ProductSettings, ProductSnapshot, SnapshotMap},
    test_utils::{memory_store::MemoryStore, prepare_env::quiet_dispatch_config, scripted_channel::ScriptedChannel},
    DispatchConfig,
    Dispatcher,
    MessageFormatter,
    ProductTracker,
    TrackOutcome,
};
use tokio::time::{Duration, Instant};

#[derive(Default, Debug, World)]
pub struct StockWorld {
    pub system: Option<MonitorSystem>,
    pub snapshots: SnapshotMap,
    pub settings: ProductSettings,
    pub dispatch_config: Option<DispatchConfig>,
    pub outcomes: Vec<TrackOutcome>,
    pub elapsed: Duration,
}

pub struct MonitorSystem {
    pub store: MemoryStore,
    pub channel: ScriptedChannel,
    pub tracker: ProductTracker<MemoryStore, ScriptedChannel>,
}

impl std::fmt::Debug for MonitorSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MonitorSystem")
    }
}

impl StockWorld {
    /// The tracker, created on first use from whatever snapshots the scenario has set up so far.
    pub async fn system(&mut self) -> &MonitorSystem {
        if self.system.is_none() {
            let config = self.dispatch_config.clone().unwrap_or_else(quiet_dispatch_config);
            let system = MonitorSystem::new(self.snapshots.clone(), config).await;
            self.system = Some(system);
        }
        self.system.as_ref().expect("System not initialised")
    }

    pub fn channel(&self) -> &ScriptedChannel {
        &self.system.as_ref().expect("System not initialised").channel
    }

    pub fn last_outcome(&self) -> &TrackOutcome {
        self.outcomes.last().expect("Nothing has been tracked yet")
    }

    pub fn add_snapshot(&mut self, name: &str, snapshot: ProductSnapshot) {
        self.snapshots.insert(name.to_string(), snapshot);
    }

    pub fn start_timer(&self) -> Instant {
        Instant::now()
    }
}

impl MonitorSystem {
    pub async fn new(snapshots: SnapshotMap, config: DispatchConfig) -> Self {
        let store = MemoryStore::with_snapshots(snapshots);
        let channel = ScriptedChannel::new();
        let dispatcher = Dispatcher::new(channel.clone(), config);
        let tracker = ProductTracker::load(store.clone(), dispatcher, MessageFormatter::default())
            .await
            .expect("Error loading snapshots");
        debug!("🚀️ Tracker ready");
        Self { store, channel, tracker }
    }
}
