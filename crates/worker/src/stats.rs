//! Periodic activity logging.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use telemetry::metrics;
use tracing::info;

use presence_core::{PresenceTiming, Result};
use presence_store::PresenceStore;

/// Worker that refreshes the activity gauges and logs a metrics snapshot.
pub struct StatsWorker {
    store: Arc<dyn PresenceStore>,
    timing: PresenceTiming,
}

impl StatsWorker {
    pub fn new(store: Arc<dyn PresenceStore>, timing: PresenceTiming) -> Self {
        Self { store, timing }
    }

    /// Run one stats pass.
    pub async fn run(&self) -> Result<()> {
        let stale_before = Utc::now() - self.timing.staleness_window();
        let active = self.store.count_active(None, stale_before).await?;

        // Epoch cutoff counts every row, fresh or stale
        let epoch = Utc.timestamp_millis_opt(0).single().unwrap_or_else(Utc::now);
        let tracked = self.store.count_active(None, epoch).await?;

        metrics().total_active.set(active);
        metrics().tracked_sessions.set(tracked);

        let snapshot = metrics().snapshot();
        info!(
            total_active = snapshot.total_active,
            tracked_sessions = snapshot.tracked_sessions,
            heartbeats_received = snapshot.heartbeats_received,
            heartbeat_failures = snapshot.heartbeat_failures,
            sessions_deregistered = snapshot.sessions_deregistered,
            sessions_reaped = snapshot.sessions_reaped,
            count_queries = snapshot.count_queries,
            count_cache_hits = snapshot.count_cache_hits,
            "Presence activity"
        );

        Ok(())
    }
}
