//! In-process presence store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use presence_core::{Result, Session};

use crate::PresenceStore;

/// Authoritative session table held in memory.
///
/// Presence data is ephemeral by nature (every record ages out within the
/// staleness window), so the service keeps it in process rather than in a
/// database. Clone shares the underlying table.
#[derive(Clone, Default)]
pub struct MemoryStore {
    sessions: std::sync::Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of session records, fresh or not.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Look up a session record by id.
    pub fn get(&self, session_id: Uuid) -> Option<Session> {
        self.sessions.read().get(&session_id).cloned()
    }
}

#[async_trait]
impl PresenceStore for MemoryStore {
    async fn upsert_session(&self, session: Session) -> Result<()> {
        session.check()?;
        self.sessions.write().insert(session.session_id, session);
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.sessions.write().remove(&session_id);
        Ok(())
    }

    async fn count_active(
        &self,
        event_filter: Option<&str>,
        stale_before: DateTime<Utc>,
    ) -> Result<u64> {
        let count = self
            .sessions
            .read()
            .values()
            .filter(|s| s.is_fresh(stale_before) && s.matches_event(event_filter))
            .count();
        Ok(count as u64)
    }

    async fn purge_stale(&self, stale_before: DateTime<Utc>) -> Result<u64> {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.is_fresh(stale_before));
        Ok((before - sessions.len()) as u64)
    }

    fn is_healthy(&self) -> bool {
        true
    }
}
