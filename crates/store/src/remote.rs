//! Remote presence store client.
//!
//! Speaks the presence engine's own HTTP API, so trackers embedded in
//! other services (web backend, mobile gateway) use the same
//! `PresenceStore` seam as in-process code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use presence_core::wire::{ActiveCountsResponse, HeartbeatRequest, PurgeResponse};
use presence_core::{Error, Result, Session, StoreErrorCode};

use crate::config::RemoteStoreConfig;
use crate::PresenceStore;

/// HTTP client implementing [`PresenceStore`] against a remote engine.
pub struct RemoteStore {
    base_url: String,
    http_client: reqwest::Client,
    healthy: AtomicBool,
}

impl RemoteStore {
    /// Creates a new remote store client.
    pub fn new(config: RemoteStoreConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            healthy: AtomicBool::new(true),
        })
    }

    fn transport_err(&self, op: &str, e: reqwest::Error) -> Error {
        self.healthy.store(false, Ordering::Relaxed);
        warn!(op = op, error = %e, "Presence store request failed");
        Error::store(
            StoreErrorCode::Unreachable,
            format!("{} request failed: {}", op, e),
        )
    }

    fn status_err(&self, op: &str, status: reqwest::StatusCode) -> Error {
        self.healthy.store(false, Ordering::Relaxed);
        warn!(op = op, status = %status, "Presence store returned error");
        Error::store(
            StoreErrorCode::OperationFailed,
            format!("{} returned {}", op, status),
        )
    }

    fn ok(&self) {
        self.healthy.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl PresenceStore for RemoteStore {
    async fn upsert_session(&self, session: Session) -> Result<()> {
        session.check()?;
        let url = format!("{}/presence/heartbeat", self.base_url);
        let request = HeartbeatRequest {
            session_id: session.session_id,
            event_id: session.event_id,
        };

        // The server stamps its own time; session.last_seen_at is not sent.
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_err("heartbeat", e))?;

        if !response.status().is_success() {
            return Err(self.status_err("heartbeat", response.status()));
        }

        self.ok();
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<()> {
        let url = format!("{}/presence/sessions/{}", self.base_url, session_id);

        let response = self
            .http_client
            .delete(&url)
            .send()
            .await
            .map_err(|e| self.transport_err("delete", e))?;

        if !response.status().is_success() {
            return Err(self.status_err("delete", response.status()));
        }

        self.ok();
        Ok(())
    }

    async fn count_active(
        &self,
        event_filter: Option<&str>,
        stale_before: DateTime<Utc>,
    ) -> Result<u64> {
        let url = format!("{}/presence/active", self.base_url);
        let mut query: Vec<(&str, String)> =
            vec![("stale_before_ms", stale_before.timestamp_millis().to_string())];
        if let Some(filter) = event_filter {
            query.push(("event_id", filter.to_string()));
        }

        let response = self
            .http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.transport_err("count", e))?;

        if !response.status().is_success() {
            return Err(self.status_err("count", response.status()));
        }

        let counts: ActiveCountsResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse count response");
            Error::store(StoreErrorCode::OperationFailed, format!("invalid count response: {}", e))
        })?;

        self.ok();
        Ok(match event_filter {
            Some(_) => counts.event_active,
            None => counts.total_active,
        })
    }

    async fn purge_stale(&self, stale_before: DateTime<Utc>) -> Result<u64> {
        let url = format!("{}/presence/purge", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .query(&[("stale_before_ms", stale_before.timestamp_millis().to_string())])
            .send()
            .await
            .map_err(|e| self.transport_err("purge", e))?;

        if !response.status().is_success() {
            return Err(self.status_err("purge", response.status()));
        }

        let purged: PurgeResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse purge response");
            Error::store(StoreErrorCode::OperationFailed, format!("invalid purge response: {}", e))
        })?;

        self.ok();
        Ok(purged.purged)
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}
