//! Admission state machine.
//!
//! Drives the whole waiting-room flow: join the queue, poll status on a
//! cancellable schedule, and enter automatically - exactly once - when the
//! backend signals readiness. All decisions live in the pure reducer; the
//! store executes its effects.
//!
//! The at-most-one-entry guarantee rests on two facts: the reducer runs
//! under the store's state write lock, so checking and setting
//! `entry_in_flight` is atomic with respect to overlapping poll responses,
//! and the flag is released only when the pending entry resolves or the
//! flow ends. The same flag seals finished flows: an enter result that
//! arrives after expiry or leave finds it cleared and is discarded.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod store;
pub mod types;


pub use actions::AdmissionAction;
pub use environment::AdmissionEnvironment;
pub use reducer::AdmissionReducer;
pub use store::{AdmissionStore, admission_store};
pub use types::{AdmissionPhase, AdmissionState, POLL_EFFECT};
