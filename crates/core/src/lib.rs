//! Core types for the presence engine.
//!
//! A presence "session" is one connected client instance, kept alive by
//! periodic heartbeats and aged out of the active counts once it goes
//! silent for longer than the staleness window.

pub mod error;
pub mod session;
pub mod snapshot;
pub mod timing;
pub mod wire;

pub use error::{Error, Result, StoreErrorCode, ValidationErrorCode};
pub use session::{Session, MAX_EVENT_ID_LEN};
pub use snapshot::ActivitySnapshot;
pub use timing::PresenceTiming;
