//! The polling loop.
//!
//! Every cycle re-reads the operator config, fetches all sources concurrently and feeds each source's products, in
//! page order, through the [`ProductTracker`]. Cycles never overlap: the next one starts `poll_interval` after the
//! previous one finished.
use std::{fmt::Display, time::Duration};

use futures::future::join_all;
use log::*;
use stock_engine::{
    stock_types::OperatorConfig,
    traits::{MessagingChannel, OperatorConfigSource, ProductSource, SnapshotStore},
    Delivery,
    EditOutcome,
    ProductTracker,
    TrackMode,
};

/// A tally of what happened during one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The operator config was empty, so nothing was fetched.
    pub config_unavailable: bool,
    pub sources_fetched: usize,
    pub sources_skipped: usize,
    pub products_tracked: usize,
    /// Products on a vendor page that the operator has not listed.
    pub products_ignored: usize,
    pub created: usize,
    pub edited: usize,
    pub duplicates: usize,
    /// Notifications that were called for but could not be delivered or edited.
    pub dispatch_failures: usize,
    pub save_failures: usize,
}

impl CycleReport {
    fn merge(mut self, other: CycleReport) -> Self {
        self.config_unavailable |= other.config_unavailable;
        self.sources_fetched += other.sources_fetched;
        self.sources_skipped += other.sources_skipped;
        self.products_tracked += other.products_tracked;
        self.products_ignored += other.products_ignored;
        self.created += other.created;
        self.edited += other.edited;
        self.duplicates += other.duplicates;
        self.dispatch_failures += other.dispatch_failures;
        self.save_failures += other.save_failures;
        self
    }

    fn record_delivery(&mut self, delivery: &Delivery) {
        match delivery {
            Delivery::Skipped => {},
            Delivery::Created(_) => self.created += 1,
            Delivery::Edited(EditOutcome::Failed(_)) => self.dispatch_failures += 1,
            Delivery::Edited(_) => self.edited += 1,
            Delivery::Duplicate => self.duplicates += 1,
            Delivery::Undelivered(_) => self.dispatch_failures += 1,
        }
    }
}

impl Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.config_unavailable {
            return write!(f, "skipped (no operator config)");
        }
        write!(
            f,
            "{} sources fetched, {} skipped. {} products tracked, {} ignored. {} created, {} edited, {} duplicates, {} \
             dispatch failures, {} save failures",
            self.sources_fetched,
            self.sources_skipped,
            self.products_tracked,
            self.products_ignored,
            self.created,
            self.edited,
            self.duplicates,
            self.dispatch_failures,
            self.save_failures
        )
    }
}

pub struct MonitorWorker<P, O, S, C> {
    sources: Vec<P>,
    operator_config: O,
    tracker: ProductTracker<S, C>,
    poll_interval: Duration,
}

impl<P, O, S, C> MonitorWorker<P, O, S, C>
where
    P: ProductSource,
    O: OperatorConfigSource,
    S: SnapshotStore,
    C: MessagingChannel,
{
    pub fn new(sources: Vec<P>, operator_config: O, tracker: ProductTracker<S, C>, poll_interval: Duration) -> Self {
        Self { sources, operator_config, tracker, poll_interval }
    }

    pub fn tracker(&self) -> &ProductTracker<S, C> {
        &self.tracker
    }

    /// Run forever. If `cold_start` is set, a silent pass records the current state of every product first.
    pub async fn run(&self, cold_start: bool) {
        if cold_start {
            info!("🕰️ No saved product state was found. Recording the current stock levels without notifying.");
            let report = self.run_cycle(TrackMode::ColdStart).await;
            info!("🕰️ Initial pass complete: {report}");
        }
        info!("🕰️ Stock monitor started. Polling {} sources every {:?}", self.sources.len(), self.poll_interval);
        loop {
            let report = self.run_cycle(TrackMode::Normal).await;
            info!("🕰️ Cycle complete: {report}");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Run a single pass over every source.
    pub async fn run_cycle(&self, mode: TrackMode) -> CycleReport {
        let settings = self.operator_config.load_settings().await;
        if settings.is_empty() {
            error!("🕰️ The operator config is empty. Skipping this cycle.");
            return CycleReport { config_unavailable: true, ..Default::default() };
        }
        let reports = join_all(self.sources.iter().map(|source| self.process_source(source, &settings, mode))).await;
        reports.into_iter().fold(CycleReport::default(), CycleReport::merge)
    }

    async fn process_source(&self, source: &P, settings: &OperatorConfig, mode: TrackMode) -> CycleReport {
        let mut report = CycleReport::default();
        let source_id = source.source_id();
        let products = match source.fetch_products().await {
            Ok(p) => p,
            Err(e) => {
                warn!("🕰️ [{source_id}] Skipping this source for this cycle. {e}");
                report.sources_skipped = 1;
                return report;
            },
        };
        report.sources_fetched = 1;
        for product in &products {
            let Some(product_settings) = settings.get(&product.name) else {
                debug!("🕰️ [{source_id}] {} is not in the operator config. Ignoring it.", product.name);
                report.products_ignored += 1;
                continue;
            };
            match self.tracker.track(product, product_settings, mode).await {
                Ok(outcome) => {
                    report.products_tracked += 1;
                    report.record_delivery(&outcome.delivery);
                    debug!("🕰️ [{source_id}] {}: {} / {}", product.name, outcome.action, outcome.delivery);
                },
                Err(e) => {
                    error!("🕰️ [{source_id}] {} was tracked but not saved. {e}", product.name);
                    report.products_tracked += 1;
                    report.save_failures += 1;
                },
            }
        }
        report
    }
}
