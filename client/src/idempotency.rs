//! Idempotency keys for create operations.

use std::fmt;
use uuid::Uuid;

/// Header under which the key is sent.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// A fresh-per-operation idempotency key.
///
/// Every reservation create and queue join gets a new key; reusing a key for
/// a different payload makes the backend reject the request with a conflict,
/// so keys are never cached across operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Generate a new random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The key as a header value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
