//! Presence session types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result, ValidationErrorCode};

/// Maximum length of an event id (matches the platform's event slugs).
pub const MAX_EVENT_ID_LEN: usize = 128;

/// One connected client's presence record.
///
/// Keyed by `session_id`; every browser tab or app instance is its own
/// session, there is no dedup by user identity. `event_id` is absent when
/// the client is not viewing an event page.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Session {
    /// Stable per-client identifier
    pub session_id: Uuid,
    /// Event the client is currently viewing, if any
    #[validate(length(min = 1, max = 128))]
    pub event_id: Option<String>,
    /// Last heartbeat time
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session stamped with the current time.
    pub fn new(event_id: Option<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            event_id,
            last_seen_at: Utc::now(),
        }
    }

    /// Creates a session with an explicit id, stamped with the current time.
    pub fn with_id(session_id: Uuid, event_id: Option<String>) -> Self {
        Self {
            session_id,
            event_id,
            last_seen_at: Utc::now(),
        }
    }

    /// Re-stamps the session with the current time (a heartbeat).
    pub fn touch(&mut self) {
        self.last_seen_at = Utc::now();
    }

    /// Whether this session counts as active at the given cutoff.
    pub fn is_fresh(&self, stale_before: DateTime<Utc>) -> bool {
        self.last_seen_at >= stale_before
    }

    /// Whether this session belongs to the given event filter.
    ///
    /// `None` matches every session (the global count).
    pub fn matches_event(&self, event_filter: Option<&str>) -> bool {
        match event_filter {
            None => true,
            Some(filter) => self.event_id.as_deref() == Some(filter),
        }
    }

    /// Time since the last heartbeat.
    pub fn silence(&self) -> Duration {
        Utc::now() - self.last_seen_at
    }

    /// Validates the record, mapping validator output to a coded error.
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(|e| {
            Error::validation_code(
                ValidationErrorCode::InvalidEventId,
                format!("invalid session fields: {}", e),
            )
        })
    }
}
