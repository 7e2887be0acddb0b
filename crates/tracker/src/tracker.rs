//! The presence tracker.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, warn};
use uuid::Uuid;

use presence_core::{ActivitySnapshot, Session};
use presence_store::{read_snapshot, PresenceStore};

use crate::config::TrackerConfig;

/// Current registration of this client.
///
/// Switching events rotates the session id, so a heartbeat that was
/// in flight during the switch can never resurrect the old event's row
/// under the new attribution.
#[derive(Debug, Clone)]
struct Registration {
    session_id: Uuid,
    event_id: Option<String>,
}

/// Tracks this client's presence and observes live activity counts.
///
/// On start the session is registered immediately; a heartbeat task then
/// re-stamps it on a fixed cadence while a poll task reads the aggregate
/// counts and publishes them as [`ActivitySnapshot`]s. All store failures
/// are logged and absorbed; the next tick retries.
pub struct PresenceTracker {
    registration: Arc<RwLock<Registration>>,
    store: Arc<dyn PresenceStore>,
    config: TrackerConfig,
    snapshot_rx: watch::Receiver<ActivitySnapshot>,
    heartbeat_handle: tokio::task::JoinHandle<()>,
    poll_handle: tokio::task::JoinHandle<()>,
}

impl PresenceTracker {
    /// Starts tracking: registers the session and spawns the heartbeat
    /// and poll tasks.
    ///
    /// A failed initial registration is logged, not returned; the first
    /// heartbeat tick retries it.
    pub async fn start(
        store: Arc<dyn PresenceStore>,
        event_id: Option<String>,
        config: TrackerConfig,
    ) -> Self {
        let registration = Arc::new(RwLock::new(Registration {
            session_id: Uuid::new_v4(),
            event_id,
        }));

        if let Err(e) = upsert_current(&store, &registration).await {
            warn!(error = %e, "Initial presence registration failed");
        }

        let (snapshot_tx, snapshot_rx) = watch::channel(ActivitySnapshot::empty());

        let heartbeat_handle = {
            let store = store.clone();
            let registration = registration.clone();
            let heartbeat_interval = config.heartbeat_interval;
            tokio::spawn(async move {
                let mut ticker = interval(heartbeat_interval);
                loop {
                    ticker.tick().await;
                    if let Err(e) = upsert_current(&store, &registration).await {
                        warn!(error = %e, "Heartbeat failed, retrying on next tick");
                    }
                }
            })
        };

        let poll_handle = {
            let store = store.clone();
            let registration = registration.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let mut ticker = interval(config.poll_interval);
                loop {
                    ticker.tick().await;
                    let event_id = registration.read().event_id.clone();
                    match read_snapshot(store.as_ref(), event_id.as_deref(), config.stale_before())
                        .await
                    {
                        Ok(snapshot) => {
                            let _ = snapshot_tx.send(snapshot);
                        }
                        Err(e) => {
                            // Keep publishing nothing: receivers hold the
                            // last good snapshot.
                            debug!(error = %e, "Count read failed, keeping last snapshot");
                        }
                    }
                }
            })
        };

        Self {
            registration,
            store,
            config,
            snapshot_rx,
            heartbeat_handle,
            poll_handle,
        }
    }

    /// The session id currently registered for this client.
    pub fn session_id(&self) -> Uuid {
        self.registration.read().session_id
    }

    /// The event this tracker is scoped to, if any.
    pub fn event_id(&self) -> Option<String> {
        self.registration.read().event_id.clone()
    }

    /// The most recently observed counts.
    pub fn snapshot(&self) -> ActivitySnapshot {
        *self.snapshot_rx.borrow()
    }

    /// Subscribe to count updates.
    pub fn subscribe(&self) -> watch::Receiver<ActivitySnapshot> {
        self.snapshot_rx.clone()
    }

    /// Moves this client to a different event (or off events entirely).
    ///
    /// Equivalent to tearing the tracker down and recreating it: the old
    /// session row is deregistered and a fresh session is registered under
    /// the new event id, so the client is never counted under two events
    /// at once. No-op when the event id is unchanged.
    pub async fn set_event(&self, event_id: Option<String>) {
        let old_session_id = {
            let mut registration = self.registration.write();
            if registration.event_id == event_id {
                return;
            }
            let old = registration.session_id;
            registration.session_id = Uuid::new_v4();
            registration.event_id = event_id;
            old
        };

        if let Err(e) = self.store.delete_session(old_session_id).await {
            warn!(error = %e, "Failed to deregister old-event session, staleness expiry will reclaim it");
        }

        if let Err(e) = upsert_current(&self.store, &self.registration).await {
            warn!(error = %e, "Registration under new event failed, retrying on next heartbeat");
        }
    }

    /// Stops tracking: cancels both tasks and best-effort deregisters.
    ///
    /// A failed deregistration is logged and ignored; the session ages out
    /// of the counts once its heartbeat silence exceeds the staleness
    /// window.
    pub async fn stop(self) {
        self.heartbeat_handle.abort();
        self.poll_handle.abort();

        let session_id = self.registration.read().session_id;
        if let Err(e) = self.store.delete_session(session_id).await {
            warn!(
                session_id = %session_id,
                error = %e,
                "Deregistration failed, staleness expiry will reclaim the session"
            );
        }
    }

    /// The staleness window this tracker counts against.
    pub fn staleness_window(&self) -> std::time::Duration {
        self.config.staleness_window
    }
}

impl Drop for PresenceTracker {
    fn drop(&mut self) {
        self.heartbeat_handle.abort();
        self.poll_handle.abort();
    }
}

/// Upserts the current registration stamped with the current time.
async fn upsert_current(
    store: &Arc<dyn PresenceStore>,
    registration: &Arc<RwLock<Registration>>,
) -> presence_core::Result<()> {
    let (session_id, event_id) = {
        let registration = registration.read();
        (registration.session_id, registration.event_id.clone())
    };
    store
        .upsert_session(Session::with_id(session_id, event_id))
        .await
}
