//! Stale-session reaper.
//!
//! Counting already excludes silent sessions; the reaper is the cleanup
//! pass that actually removes their rows. It runs against a cutoff of
//! twice the staleness window, so it never deletes anything the counts
//! still include.

use chrono::Utc;
use std::sync::Arc;
use telemetry::metrics;
use tracing::{debug, info};

use presence_core::{PresenceTiming, Result};
use presence_store::PresenceStore;

/// Worker that deletes session rows with long-expired heartbeats.
pub struct ReaperWorker {
    store: Arc<dyn PresenceStore>,
    timing: PresenceTiming,
}

impl ReaperWorker {
    pub fn new(store: Arc<dyn PresenceStore>, timing: PresenceTiming) -> Self {
        Self { store, timing }
    }

    /// Run one reaper pass.
    pub async fn run(&self) -> Result<()> {
        let cutoff = Utc::now() - self.timing.reap_window();
        let purged = self.store.purge_stale(cutoff).await?;

        if purged > 0 {
            metrics().sessions_reaped.inc_by(purged);
            info!(purged = purged, cutoff = %cutoff, "Reaped stale sessions");
        } else {
            debug!(cutoff = %cutoff, "No stale sessions to reap");
        }

        Ok(())
    }
}
