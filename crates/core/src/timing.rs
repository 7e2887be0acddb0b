//! Presence timing parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing knobs shared by the tracker, the API, and the reaper.
///
/// The staleness window is three missed heartbeats, so a single dropped
/// request never ages a client out of the counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceTiming {
    /// Seconds between heartbeats
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
    /// Seconds of heartbeat silence before a session leaves the counts
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
    /// Seconds between count reads on the tracker side
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
    /// Seconds between reaper passes
    #[serde(default = "default_reaper_secs")]
    pub reaper_secs: u64,
}

fn default_heartbeat_secs() -> u64 {
    15
}

fn default_staleness_secs() -> u64 {
    45
}

fn default_poll_secs() -> u64 {
    5
}

fn default_reaper_secs() -> u64 {
    60
}

impl Default for PresenceTiming {
    fn default() -> Self {
        Self {
            heartbeat_secs: default_heartbeat_secs(),
            staleness_secs: default_staleness_secs(),
            poll_secs: default_poll_secs(),
            reaper_secs: default_reaper_secs(),
        }
    }
}

impl PresenceTiming {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    pub fn staleness_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.staleness_secs as i64)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_secs)
    }

    /// Cutoff for the reaper: twice the staleness window, so counting has
    /// already excluded everything the reaper deletes.
    pub fn reap_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(2 * self.staleness_secs as i64)
    }
}
