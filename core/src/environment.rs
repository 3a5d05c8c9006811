//! Dependency injection traits.
//!
//! All external dependencies are abstracted behind traits and injected via
//! the Environment parameter of a reducer. Reducers never reach into
//! ambient globals.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability
///
/// Production uses [`SystemClock`]; tests use a fixed clock so timestamps
/// are deterministic.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// System clock backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
