//! # Turnstile Client
//!
//! Client-side admission workflow for a high-demand ticket reservation
//! flow: a visitor joins a virtual queue, polls for admission, receives a
//! time-boxed reservation hold, and must complete payment before the hold
//! expires.
//!
//! The crate is organised around two reducer-driven state machines running
//! on the [`turnstile_runtime`] store:
//!
//! - [`admission`] - joins the queue, polls status on a cancellable
//!   schedule, and auto-enters exactly once when the backend signals
//!   readiness.
//! - [`hold`] - the countdown governing the reservation-hold window;
//!   reaching zero clears the session's queue tokens and forces a restart.
//!
//! Network access goes through [`api::transport::Transport`] (timeouts,
//! bounded GET retry, auth-header injection, uniform error decoding) and
//! [`api::queue::QueueClient`], which deliberately degrades transport
//! failures into fallback values so the flow is never blocked by backend
//! unavailability. Degraded results are tagged with [`types::Sourced`] so
//! callers can always tell a synthesized value from a real one.
//!
//! Cross-page state lives in [`session::SessionStore`], an injected service
//! with selective persistence: identity and selection survive restarts,
//! tokens never do.

pub mod admission;
pub mod api;
pub mod config;
pub mod error;
pub mod hold;
pub mod idempotency;
pub mod mocks;
pub mod session;
pub mod types;

pub use config::Config;
pub use error::ApiError;
pub use idempotency::IdempotencyKey;
pub use session::SessionStore;
pub use types::{QueueState, QueueStatus, ReservationToken, Source, Sourced, WaitingToken};
