//! Admission state types.

use crate::api::queue::JoinGrant;
use crate::types::{QueueStatus, ReservationToken, Sourced, WaitingToken};
use turnstile_core::effect::EffectId;

/// Cancellation id for the polling schedule. Both the delay ticks and the
/// in-flight status fetches register under it, so one cancel silences the
/// whole loop.
pub const POLL_EFFECT: EffectId = EffectId::new("admission.poll");

/// Lifecycle phase of the admission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPhase {
    /// No flow in progress.
    Idle,
    /// In line, polling for status.
    Waiting,
    /// Backend signalled readiness; entry not yet in flight.
    ReadyForEntry,
    /// Entry request in flight.
    Entering,
    /// Admission granted; reservation token held.
    Entered,
    /// Waiting token expired; flow must restart from join.
    Expired,
}

impl AdmissionPhase {
    /// Whether the flow has finished, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Entered | Self::Expired)
    }
}

/// Full state of the admission machine.
#[derive(Debug, Clone)]
pub struct AdmissionState {
    /// Current phase.
    pub phase: AdmissionPhase,
    /// Queue membership token, tagged with its source.
    pub waiting_token: Option<Sourced<WaitingToken>>,
    /// Admission grant, tagged with its source.
    pub reservation_token: Option<Sourced<ReservationToken>>,
    /// Most recent status observation.
    pub last_status: Option<QueueStatus>,
    /// Guard ensuring at most one entry request is in flight.
    pub entry_in_flight: bool,
    /// Number of poll rounds issued so far.
    pub polls: u64,
    /// Last entry failure, for display.
    pub last_error: Option<String>,
}

impl Default for AdmissionState {
    fn default() -> Self {
        Self {
            phase: AdmissionPhase::Idle,
            waiting_token: None,
            reservation_token: None,
            last_status: None,
            entry_in_flight: false,
            polls: 0,
            last_error: None,
        }
    }
}

impl AdmissionState {
    /// State immediately after a join grant, used by tests and by resuming
    /// flows that already hold a token.
    #[must_use]
    pub fn waiting_with(grant: Sourced<JoinGrant>) -> Self {
        Self {
            phase: AdmissionPhase::Waiting,
            waiting_token: Some(grant.map(|g| g.waiting_token)),
            ..Self::default()
        }
    }
}
