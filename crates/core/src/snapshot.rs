//! Derived activity aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time view of active session counts.
///
/// Recomputed from the set of fresh sessions, never persisted. The two
/// counts come from separate reads; the constructor clamps so that
/// `event_active <= total_active` holds at every observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    /// Active sessions across the whole platform
    pub total_active: u64,
    /// Active sessions scoped to one event
    pub event_active: u64,
    /// When the counts were read
    pub taken_at: DateTime<Utc>,
}

impl ActivitySnapshot {
    /// Builds a snapshot, clamping the event count to the total.
    pub fn new(total_active: u64, event_active: u64) -> Self {
        Self {
            total_active,
            event_active: event_active.min(total_active),
            taken_at: Utc::now(),
        }
    }

    /// An empty snapshot, used before the first successful count read.
    pub fn empty() -> Self {
        Self::new(0, 0)
    }
}
