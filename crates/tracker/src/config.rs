//! Tracker configuration.

use presence_core::PresenceTiming;
use std::time::Duration;

/// Tracker timing configuration.
///
/// Sub-second values are allowed so tests can run the full lifecycle
/// without multi-second waits.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Interval between heartbeats
    pub heartbeat_interval: Duration,
    /// Interval between count reads
    pub poll_interval: Duration,
    /// Heartbeat silence after which a session leaves the counts
    pub staleness_window: Duration,
}

impl TrackerConfig {
    /// Builds a tracker config from the shared presence timing.
    pub fn from_timing(timing: &PresenceTiming) -> Self {
        Self {
            heartbeat_interval: timing.heartbeat_interval(),
            poll_interval: timing.poll_interval(),
            staleness_window: Duration::from_secs(timing.staleness_secs),
        }
    }

    /// Cutoff timestamp for "active" at the current instant.
    pub fn stale_before(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
            - chrono::Duration::from_std(self.staleness_window)
                .unwrap_or_else(|_| chrono::Duration::seconds(45))
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::from_timing(&PresenceTiming::default())
    }
}
