//! Uniform API error type.
//!
//! Every failure mode of the HTTP layer collapses into [`ApiError`]:
//! structured backend errors (decoded from the `{"error": {...}}` envelope),
//! transport failures, timeouts, and undecodable bodies. Callers branch on
//! [`ApiError::is_transient`] to decide between retry/fallback and surfacing
//! the error.

use serde::Deserialize;
use thiserror::Error;

/// Error code used when a failure response body cannot be decoded.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Status codes treated as transient for retry and fallback purposes.
pub(crate) const RETRYABLE_STATUS: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Unified error for all API operations.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend returned a structured error response.
    #[error("{code}: {message} (status {status})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code from the envelope, or
        /// [`UNKNOWN_ERROR`] when the body was undecodable.
        code: String,
        /// Human-readable message.
        message: String,
        /// Server-side trace id, when the envelope carried one.
        trace_id: Option<String>,
    },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded the client-side timeout.
    #[error("request timed out")]
    Timeout,

    /// A success response carried a body we could not decode.
    #[error("undecodable response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Api { code, .. } => code,
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Decode(_) => UNKNOWN_ERROR,
        }
    }

    /// HTTP status, when an HTTP response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure is worth retrying or degrading into a fallback.
    ///
    /// Transport failures and timeouts are always transient. HTTP errors are
    /// transient only for the conventional retryable status codes; everything
    /// else (404, 409, 401, ...) is a domain error the caller must see.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => RETRYABLE_STATUS.contains(status),
            Self::Transport(_) | Self::Timeout => true,
            Self::Decode(_) => false,
        }
    }
}

/// Wire shape of backend failure responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub trace_id: Option<String>,
}
