//! Common test setup functions.

use axum::Router;
use std::sync::Arc;

use api::{router, state::AppState};
use presence_core::PresenceTiming;
use presence_store::{MemoryStore, PresenceStore};

use crate::mocks::FlakyStore;

/// Test context running the real router over an in-memory store.
///
/// Production code paths are exercised end to end: the same Axum router,
/// middleware stack, and `PresenceStore` seam the binary wires up.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub timing: PresenceTiming,
    pub router: Router,
}

impl TestContext {
    /// Create a test context over a fresh memory store.
    pub fn new() -> Self {
        Self::with_timing(PresenceTiming::default())
    }

    /// Create a test context with custom timing.
    pub fn with_timing(timing: PresenceTiming) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone() as Arc<dyn PresenceStore>, timing.clone());

        Self {
            store,
            timing,
            router: router(state),
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Test context whose store can be made to fail per operation.
pub struct FlakyContext {
    pub store: Arc<FlakyStore>,
    pub router: Router,
}

impl FlakyContext {
    pub fn new() -> Self {
        let store = Arc::new(FlakyStore::new());
        let state = AppState::new(
            store.clone() as Arc<dyn PresenceStore>,
            PresenceTiming::default(),
        );

        Self {
            store,
            router: router(state),
        }
    }
}

impl Default for FlakyContext {
    fn default() -> Self {
        Self::new()
    }
}
