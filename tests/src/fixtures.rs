//! Test fixtures and builders.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use presence_core::Session;

/// A heartbeat request body for the given session and event.
pub fn heartbeat_body(session_id: Uuid, event_id: Option<&str>) -> Value {
    match event_id {
        Some(event_id) => json!({ "session_id": session_id, "event_id": event_id }),
        None => json!({ "session_id": session_id }),
    }
}

/// A session whose last heartbeat is `age_secs` in the past.
pub fn aged_session(event_id: Option<&str>, age_secs: i64) -> Session {
    let mut session = Session::new(event_id.map(String::from));
    session.last_seen_at = Utc::now() - Duration::seconds(age_secs);
    session
}

/// A cutoff `secs` seconds before now, as epoch milliseconds for query
/// strings.
pub fn cutoff_ms(secs: i64) -> i64 {
    cutoff(secs).timestamp_millis()
}

/// A cutoff `secs` seconds before now.
pub fn cutoff(secs: i64) -> DateTime<Utc> {
    Utc::now() - Duration::seconds(secs)
}
