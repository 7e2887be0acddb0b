//! Presence endpoints: heartbeat, deregistration, counts, purge.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use telemetry::metrics;
use tracing::{debug, info, warn};
use uuid::Uuid;

use presence_core::wire::{
    ActiveCountsResponse, HeartbeatRequest, HeartbeatResponse, PurgeResponse,
};
use presence_core::{Session, ValidationErrorCode, MAX_EVENT_ID_LEN};

use crate::response::ApiError;
use crate::state::AppState;

/// Query parameters for count and purge endpoints.
#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub event_id: Option<String>,
    /// Explicit cutoff, epoch milliseconds. Defaults to now minus the
    /// staleness window.
    pub stale_before_ms: Option<i64>,
}

fn parse_stale_before(ms: Option<i64>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match ms {
        None => Ok(None),
        Some(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("invalid stale_before_ms: {}", ms))),
    }
}

fn check_event_id(event_id: Option<&str>) -> Result<(), ApiError> {
    if let Some(event_id) = event_id {
        if event_id.is_empty() || event_id.len() > MAX_EVENT_ID_LEN {
            return Err(ApiError::with_code(
                StatusCode::BAD_REQUEST,
                ValidationErrorCode::InvalidEventId.code(),
                format!("event_id must be 1-{} characters", MAX_EVENT_ID_LEN),
            ));
        }
    }
    Ok(())
}

/// POST /presence/heartbeat - register or re-stamp a session.
///
/// The server stamps its own clock; clients only supply identity.
pub async fn heartbeat_handler(
    State(state): State<AppState>,
    Json(request): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    check_event_id(request.event_id.as_deref())?;

    let session = Session::with_id(request.session_id, request.event_id);

    debug!(
        session_id = %session.session_id,
        event_id = session.event_id.as_deref().unwrap_or("-"),
        "Heartbeat"
    );

    state.store.upsert_session(session).await.map_err(|e| {
        metrics().heartbeat_failures.inc();
        warn!(error = %e, "Failed to store heartbeat");
        ApiError::from(e)
    })?;

    metrics().heartbeats_received.inc();
    Ok(Json(HeartbeatResponse::now()))
}

/// DELETE /presence/sessions/{session_id} - deregister a session.
pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_session(session_id).await.map_err(|e| {
        metrics().deregister_failures.inc();
        warn!(session_id = %session_id, error = %e, "Failed to deregister session");
        ApiError::from(e)
    })?;

    metrics().sessions_deregistered.inc();
    debug!(session_id = %session_id, "Session deregistered");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /presence/active - total and event-scoped active counts.
pub async fn active_handler(
    State(state): State<AppState>,
    Query(query): Query<ActiveQuery>,
) -> Result<Json<ActiveCountsResponse>, ApiError> {
    check_event_id(query.event_id.as_deref())?;
    let stale_before = parse_stale_before(query.stale_before_ms)?;

    let counts = state
        .read_counts(query.event_id.as_deref(), stale_before)
        .await
        .map_err(|e| {
            metrics().count_query_errors.inc();
            warn!(error = %e, "Count read failed");
            ApiError::from(e)
        })?;

    Ok(Json(counts))
}

/// POST /presence/purge - delete sessions stale beyond the cutoff.
pub async fn purge_handler(
    State(state): State<AppState>,
    Query(query): Query<ActiveQuery>,
) -> Result<Json<PurgeResponse>, ApiError> {
    let stale_before = parse_stale_before(query.stale_before_ms)?
        .unwrap_or_else(|| state.default_stale_before());

    let purged = state
        .store
        .purge_stale(stale_before)
        .await
        .map_err(ApiError::from)?;

    if purged > 0 {
        metrics().sessions_reaped.inc_by(purged);
        info!(purged = purged, "Purged stale sessions");
    }
    Ok(Json(PurgeResponse { purged }))
}
