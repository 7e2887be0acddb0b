//! Client-side presence tracking.
//!
//! A [`PresenceTracker`] registers one session with the presence store,
//! keeps it alive with heartbeats, and publishes live activity counts
//! over a watch channel. Both background tasks are scoped to the tracker
//! and cancelled when it stops or drops.

pub mod config;
pub mod tracker;

pub use config::TrackerConfig;
pub use tracker::PresenceTracker;
