//! Reservation hold countdown.
//!
//! A reducer-driven timer covering the window in which a held reservation
//! must be paid. Ticks arrive once per second as cancellable delay effects;
//! reaching zero fires exactly one expiry, which clears the session's queue
//! state synchronously and invokes the environment's expiry hook. Stopping
//! is idempotent: cancelling a timer that is not running is a no-op, and a
//! tick that raced a cancel is discarded by the `running` guard.

pub mod environment;
pub mod reducer;
pub mod types;


pub use environment::HoldEnvironment;
pub use reducer::HoldReducer;
pub use types::{HOLD_TICK_EFFECT, HoldAction, HoldState};

use turnstile_runtime::Store;

/// Store type driving the hold countdown.
pub type HoldStore = Store<HoldState, HoldAction, HoldEnvironment, HoldReducer>;

/// Create a hold store with no countdown running.
#[must_use]
pub fn hold_store(environment: HoldEnvironment) -> HoldStore {
    Store::new(HoldState::default(), HoldReducer, environment)
}
