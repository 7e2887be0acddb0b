//! Request/response types shared by the API and the remote store client.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /presence/heartbeat request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub session_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// POST /presence/heartbeat response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub success: bool,
    /// Server-side stamp, epoch milliseconds
    pub timestamp: i64,
}

impl HeartbeatResponse {
    pub fn now() -> Self {
        Self {
            success: true,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// GET /presence/active response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveCountsResponse {
    pub total_active: u64,
    pub event_active: u64,
    pub timestamp: i64,
}

/// POST /presence/purge response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub purged: u64,
}
