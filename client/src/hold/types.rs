//! Hold countdown state and actions.

use chrono::{DateTime, Utc};
use turnstile_core::effect::EffectId;

/// Cancellation id for the tick schedule.
pub const HOLD_TICK_EFFECT: EffectId = EffectId::new("hold.tick");

/// State of the hold countdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldState {
    /// Seconds remaining.
    pub remaining: u64,
    /// Configured window length for the current run.
    pub duration: u64,
    /// Whether the countdown is live.
    pub running: bool,
    /// Whether the last run ended by expiry (as opposed to cancellation).
    pub expired: bool,
    /// When the current run started.
    pub started_at: Option<DateTime<Utc>>,
}

/// Actions on the hold countdown.
#[derive(Debug, Clone)]
pub enum HoldAction {
    /// Begin (or restart) a countdown over the given window.
    Start {
        /// Window length in seconds.
        duration_secs: u64,
    },
    /// One second elapsed.
    Tick,
    /// Stop the countdown without expiring. Idempotent.
    Cancel,
}
