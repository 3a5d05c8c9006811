//! # Turnstile Core
//!
//! Core traits and types for the Turnstile queue-admission client.
//!
//! The admission flow is modeled with the Reducer pattern: all business
//! logic lives in pure functions, all I/O is described as effect values and
//! executed by the store runtime.
//!
//! ## Core Concepts
//!
//! - **State**: domain state for a feature (admission phase, hold countdown)
//! - **Action**: all possible inputs to a reducer (commands, poll results,
//!   timer ticks)
//! - **Reducer**: pure function `(State, Action, Environment) → Effects`
//! - **Effect**: side effect descriptions (not execution)
//! - **Environment**: injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Explicit cancellation: recurring work is scheduled under an
//!   [`effect::EffectId`] and torn down with [`effect::Effect::Cancel`]

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod effect;
pub mod environment;
pub mod reducer;

pub use effect::{Effect, EffectId};
pub use environment::Clock;
pub use reducer::Reducer;
