//! Internal telemetry for the presence engine.
//!
//! Counts and gauges live in-memory and surface through logs and the
//! health endpoints; there is no external metrics system.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
