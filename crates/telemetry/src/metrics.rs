//! Internal metrics collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Collected metrics for the presence engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Heartbeat path
    pub heartbeats_received: Counter,
    pub heartbeat_failures: Counter,

    // Deregistration path
    pub sessions_deregistered: Counter,
    pub deregister_failures: Counter,

    // Count reads
    pub count_queries: Counter,
    pub count_query_errors: Counter,
    pub count_cache_hits: Counter,

    // Reaper
    pub sessions_reaped: Counter,

    // Last observed aggregates
    pub total_active: Gauge,
    pub tracked_sessions: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            heartbeats_received: self.heartbeats_received.get(),
            heartbeat_failures: self.heartbeat_failures.get(),
            sessions_deregistered: self.sessions_deregistered.get(),
            deregister_failures: self.deregister_failures.get(),
            count_queries: self.count_queries.get(),
            count_query_errors: self.count_query_errors.get(),
            count_cache_hits: self.count_cache_hits.get(),
            sessions_reaped: self.sessions_reaped.get(),
            total_active: self.total_active.get(),
            tracked_sessions: self.tracked_sessions.get(),
        }
    }
}

/// A snapshot of metrics at a point in time, logged by the stats worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub heartbeats_received: u64,
    pub heartbeat_failures: u64,
    pub sessions_deregistered: u64,
    pub deregister_failures: u64,
    pub count_queries: u64,
    pub count_query_errors: u64,
    pub count_cache_hits: u64,
    pub sessions_reaped: u64,
    pub total_active: u64,
    pub tracked_sessions: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
