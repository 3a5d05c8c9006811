//! Core domain types shared across the admission flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a value came from: the real backend, or a client-side fallback
/// synthesized after a degraded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Produced by a successful backend response.
    Real,
    /// Synthesized locally because the backend call failed.
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A value tagged with its [`Source`].
///
/// Queue operations never make callers distinguish success from degraded
/// success by shape; both carry the same payload, and the tag is the only
/// difference. This replaces the older pattern of smuggling an `is_fallback`
/// attribute inside the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum Sourced<T> {
    /// A real backend value.
    Real(T),
    /// A locally synthesized fallback.
    Fallback(T),
}

impl<T> Sourced<T> {
    /// The source tag.
    #[must_use]
    pub const fn source(&self) -> Source {
        match self {
            Self::Real(_) => Source::Real,
            Self::Fallback(_) => Source::Fallback,
        }
    }

    /// Whether this value was synthesized locally.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Borrow the inner value, whatever its source.
    #[must_use]
    pub const fn value(&self) -> &T {
        match self {
            Self::Real(value) | Self::Fallback(value) => value,
        }
    }

    /// Consume and return the inner value.
    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Self::Real(value) | Self::Fallback(value) => value,
        }
    }

    /// Map the inner value, preserving the source tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        match self {
            Self::Real(value) => Sourced::Real(f(value)),
            Self::Fallback(value) => Sourced::Fallback(f(value)),
        }
    }
}

/// Opaque token proving queue membership, obtained from a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingToken {
    value: String,
    issued_at: DateTime<Utc>,
}

impl WaitingToken {
    /// Wrap a raw token string.
    #[must_use]
    pub const fn new(value: String, issued_at: DateTime<Utc>) -> Self {
        Self { value, issued_at }
    }

    /// The raw token string as sent on the wire.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When the client received this token.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

/// Token granting the right to create a reservation, valid for a limited
/// time window. Single-use: consumed by a successful reservation create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationToken {
    value: String,
    ttl_seconds: u64,
    issued_at: DateTime<Utc>,
}

impl ReservationToken {
    /// Wrap a raw token string with its advertised time-to-live.
    #[must_use]
    pub const fn new(value: String, ttl_seconds: u64, issued_at: DateTime<Utc>) -> Self {
        Self {
            value,
            ttl_seconds,
            issued_at,
        }
    }

    /// The raw token string as sent on the wire.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Advertised validity window in seconds.
    #[must_use]
    pub const fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// When the client received this token.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

/// Position in the admission lifecycle as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    /// Still in line.
    Waiting,
    /// Eligible to enter.
    Ready,
    /// The waiting token is no longer valid; the flow must restart.
    Expired,
}

/// One observation from the queue status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Lifecycle state.
    pub state: QueueState,
    /// Current position in line, when the backend reports one.
    pub position: Option<u64>,
    /// Estimated seconds until admission.
    pub eta_seconds: Option<u64>,
    /// Seconds spent waiting so far.
    pub waiting_time: Option<u64>,
    /// Explicit admission signal. Entry is attempted when either this is
    /// set or [`QueueStatus::state`] is [`QueueState::Ready`].
    pub ready_for_entry: bool,
}

impl QueueStatus {
    /// Whether this observation permits an entry attempt.
    #[must_use]
    pub fn admits_entry(&self) -> bool {
        self.ready_for_entry || self.state == QueueState::Ready
    }

    /// A plain waiting observation with no position data.
    #[must_use]
    pub const fn waiting() -> Self {
        Self {
            state: QueueState::Waiting,
            position: None,
            eta_seconds: None,
            waiting_time: None,
            ready_for_entry: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sourced_preserves_tag_through_map() {
        let fallback = Sourced::Fallback(5u32).map(|n| n * 2);
        assert_eq!(fallback, Sourced::Fallback(10));
        assert!(fallback.is_fallback());

        let real = Sourced::Real("a").map(str::to_owned);
        assert_eq!(real.source(), Source::Real);
        assert_eq!(real.into_value(), "a");
    }

    #[test]
    fn ready_state_admits_entry_without_explicit_flag() {
        let status = QueueStatus {
            state: QueueState::Ready,
            ready_for_entry: false,
            ..QueueStatus::waiting()
        };
        assert!(status.admits_entry());
        assert!(!QueueStatus::waiting().admits_entry());
    }

    #[test]
    fn explicit_flag_admits_entry_while_still_waiting() {
        let status = QueueStatus {
            ready_for_entry: true,
            ..QueueStatus::waiting()
        };
        assert!(status.admits_entry());
    }
}
