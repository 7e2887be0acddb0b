//! Application state shared across handlers.

use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::debug;

use presence_core::wire::ActiveCountsResponse;
use presence_core::{PresenceTiming, Result};
use presence_store::{read_snapshot, PresenceStore};

/// Cache TTL for count reads.
///
/// Every polling client asks the same question; a short TTL bounds store
/// load without making the displayed counts noticeably stale.
const COUNT_CACHE_TTL: Duration = Duration::from_secs(2);

/// Maximum cached event-id entries.
const COUNT_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Presence store (memory in production, flaky mock in tests)
    pub store: Arc<dyn PresenceStore>,
    /// Shared timing parameters
    pub timing: PresenceTiming,
    /// Count cache (event id -> counts)
    count_cache: Cache<String, ActiveCountsResponse>,
}

impl AppState {
    pub fn new(store: Arc<dyn PresenceStore>, timing: PresenceTiming) -> Self {
        Self {
            store,
            timing,
            count_cache: Cache::builder()
                .max_capacity(COUNT_CACHE_MAX_CAPACITY)
                .time_to_live(COUNT_CACHE_TTL)
                .build(),
        }
    }

    /// Default cutoff: now minus the staleness window.
    pub fn default_stale_before(&self) -> DateTime<Utc> {
        Utc::now() - self.timing.staleness_window()
    }

    /// Reads active counts for an optional event filter.
    ///
    /// Reads against the default cutoff go through the cache; an explicit
    /// `stale_before` bypasses it (the caller asked for a precise instant).
    pub async fn read_counts(
        &self,
        event_id: Option<&str>,
        stale_before: Option<DateTime<Utc>>,
    ) -> Result<ActiveCountsResponse> {
        metrics().count_queries.inc();

        if let Some(cutoff) = stale_before {
            return self.compute_counts(event_id, cutoff).await;
        }

        let cache_key = event_id.unwrap_or_default().to_string();
        if let Some(cached) = self.count_cache.get(&cache_key).await {
            metrics().count_cache_hits.inc();
            debug!(event_id = %cache_key, "Count cache hit");
            return Ok(cached);
        }

        let counts = self
            .compute_counts(event_id, self.default_stale_before())
            .await?;
        self.count_cache.insert(cache_key, counts.clone()).await;
        Ok(counts)
    }

    async fn compute_counts(
        &self,
        event_id: Option<&str>,
        stale_before: DateTime<Utc>,
    ) -> Result<ActiveCountsResponse> {
        let snapshot = read_snapshot(self.store.as_ref(), event_id, stale_before).await?;
        metrics().total_active.set(snapshot.total_active);

        Ok(ActiveCountsResponse {
            total_active: snapshot.total_active,
            event_active: snapshot.event_active,
            timestamp: snapshot.taken_at.timestamp_millis(),
        })
    }
}
