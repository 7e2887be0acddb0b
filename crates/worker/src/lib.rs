//! Background workers for the presence engine.

pub mod reaper;
pub mod scheduler;
pub mod stats;

pub use reaper::ReaperWorker;
pub use scheduler::{WorkerConfig, WorkerScheduler};
pub use stats::StatsWorker;
