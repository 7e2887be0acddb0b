//! Presence store for the presence engine.
//!
//! The store is the one shared resource in the system: a set of session
//! records keyed by session id. Everything else depends only on the four
//! operations of the [`PresenceStore`] trait, so the service runs against
//! [`MemoryStore`] while embedded trackers in other processes use
//! [`RemoteStore`] over the service's HTTP API.

pub mod config;
pub mod memory;
pub mod remote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use presence_core::{ActivitySnapshot, Result, Session};
use uuid::Uuid;

pub use config::RemoteStoreConfig;
pub use memory::MemoryStore;
pub use remote::RemoteStore;

/// Backend presence store operations.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Insert or re-stamp a session record, keyed by its session id.
    async fn upsert_session(&self, session: Session) -> Result<()>;

    /// Remove a session record. Unknown ids are a no-op.
    async fn delete_session(&self, session_id: Uuid) -> Result<()>;

    /// Count sessions whose last heartbeat is at or after `stale_before`,
    /// optionally filtered by event id.
    async fn count_active(
        &self,
        event_filter: Option<&str>,
        stale_before: DateTime<Utc>,
    ) -> Result<u64>;

    /// Delete sessions whose last heartbeat is before `stale_before`,
    /// returning how many were removed.
    async fn purge_stale(&self, stale_before: DateTime<Utc>) -> Result<u64>;

    /// Whether the store is reachable.
    fn is_healthy(&self) -> bool;
}

/// Reads both counts and folds them into a snapshot.
///
/// The two reads race against concurrent heartbeats; the snapshot
/// constructor clamps the event count to the total.
pub async fn read_snapshot(
    store: &dyn PresenceStore,
    event_filter: Option<&str>,
    stale_before: DateTime<Utc>,
) -> Result<ActivitySnapshot> {
    let total = store.count_active(None, stale_before).await?;
    let event = match event_filter {
        Some(filter) => store.count_active(Some(filter), stale_before).await?,
        None => 0,
    };
    Ok(ActivitySnapshot::new(total, event))
}
