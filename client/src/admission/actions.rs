//! Admission actions.

use crate::api::queue::{AdmissionGrant, JoinGrant};
use crate::types::{QueueStatus, Sourced};

/// Everything that can happen to the admission machine: user intents
/// (`Join`, `Leave`), the polling schedule (`PollTick`), and effect
/// completions feeding results back in.
#[derive(Debug, Clone)]
pub enum AdmissionAction {
    /// Start the flow for an event.
    Join {
        /// Event to queue for.
        event_id: String,
        /// Joining user.
        user_id: String,
    },
    /// Join completed (possibly with a fallback grant).
    Joined {
        /// The grant, tagged with its source.
        grant: Sourced<JoinGrant>,
    },
    /// A scheduled poll fired.
    PollTick,
    /// A status fetch completed.
    StatusReceived {
        /// The observation, tagged with its source.
        status: Sourced<QueueStatus>,
    },
    /// Entry succeeded.
    EntryGranted {
        /// The admission grant, tagged with its source.
        grant: Sourced<AdmissionGrant>,
    },
    /// Entry failed with a domain error.
    EntryFailed {
        /// Rendered error message.
        error: String,
    },
    /// Abandon the queue.
    Leave,
}
