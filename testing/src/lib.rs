//! # Turnstile Testing
//!
//! Testing utilities for the Turnstile admission client.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (fixed clocks)
//! - A fluent Given-When-Then harness for reducers
//! - Assertion helpers for effect vectors
//!
//! ## Example
//!
//! ```ignore
//! use turnstile_testing::ReducerTest;
//!
//! ReducerTest::new(HoldReducer)
//!     .with_env(test_environment())
//!     .given_state(HoldState::default())
//!     .when_action(HoldAction::Tick)
//!     .then_state(|state| assert_eq!(state.remaining, 179))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use turnstile_core::environment::Clock;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use turnstile_testing::mocks::FixedClock;
    /// use turnstile_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub mod reducer_test;

pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
