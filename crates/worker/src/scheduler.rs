//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

use presence_core::PresenceTiming;
use presence_store::PresenceStore;

use crate::reaper::ReaperWorker;
use crate::stats::StatsWorker;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Reaper pass interval
    pub reaper_interval: Duration,
    /// Stats logging interval
    pub stats_interval: Duration,
}

impl WorkerConfig {
    pub fn from_timing(timing: &PresenceTiming) -> Self {
        Self {
            reaper_interval: timing.reaper_interval(),
            stats_interval: Duration::from_secs(60),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::from_timing(&PresenceTiming::default())
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    store: Arc<dyn PresenceStore>,
    timing: PresenceTiming,
}

impl WorkerScheduler {
    pub fn new(config: WorkerConfig, store: Arc<dyn PresenceStore>, timing: PresenceTiming) -> Self {
        Self {
            config,
            store,
            timing,
        }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        // Reaper worker
        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_reaper_worker().await;
        }));

        // Stats worker
        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_stats_worker().await;
        }));

        info!("Background workers started");
        handles
    }

    async fn run_reaper_worker(&self) {
        let worker = ReaperWorker::new(self.store.clone(), self.timing.clone());
        let mut ticker = interval(self.config.reaper_interval);

        loop {
            ticker.tick().await;

            if let Err(e) = worker.run().await {
                error!("Reaper worker error: {}", e);
            }
        }
    }

    async fn run_stats_worker(&self) {
        let worker = StatsWorker::new(self.store.clone(), self.timing.clone());
        let mut ticker = interval(self.config.stats_interval);

        loop {
            ticker.tick().await;

            if let Err(e) = worker.run().await {
                error!("Stats worker error: {}", e);
            }
        }
    }
}
