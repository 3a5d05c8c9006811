//! Client configuration.
//!
//! Loaded from environment variables with conservative defaults; every knob
//! has a `TURNSTILE_`-prefixed override so deployments can tune the client
//! without a rebuild.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP transport settings.
    pub api: ApiConfig,
    /// Queue polling and fallback settings.
    pub queue: QueueConfig,
    /// Reservation hold countdown settings.
    pub hold: HoldConfig,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all request paths are appended to.
    pub base_url: String,
    /// Path prefix for the reservation endpoints.
    pub reservation_prefix: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries for idempotent (GET) requests.
    pub retry_limit: u32,
    /// Initial backoff delay in milliseconds.
    pub backoff_initial_ms: u64,
    /// Upper bound on any single backoff delay in milliseconds.
    pub backoff_cap_ms: u64,
}

/// Queue polling and fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Delay between status polls in milliseconds.
    pub polling_interval_ms: u64,
    /// Validity window advertised on fallback admission grants, in seconds.
    pub fallback_enter_ttl_secs: u64,
}

/// Reservation hold countdown settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldConfig {
    /// Hold window in seconds.
    pub duration_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            reservation_prefix: "/api/v1/reservations".to_owned(),
            timeout_ms: 5_000,
            retry_limit: 2,
            backoff_initial_ms: 300,
            backoff_cap_ms: 30_000,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 2_000,
            fallback_enter_ttl_secs: 30,
        }
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self { duration_secs: 180 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            queue: QueueConfig::default(),
            hold: HoldConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Initial backoff delay.
    #[must_use]
    pub const fn backoff_initial(&self) -> Duration {
        Duration::from_millis(self.backoff_initial_ms)
    }

    /// Backoff delay cap.
    #[must_use]
    pub const fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.backoff_cap_ms)
    }
}

impl QueueConfig {
    /// Delay between status polls.
    #[must_use]
    pub const fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let api_defaults = ApiConfig::default();
        let queue_defaults = QueueConfig::default();
        let hold_defaults = HoldConfig::default();

        Self {
            api: ApiConfig {
                base_url: env_or("TURNSTILE_API_BASE", api_defaults.base_url),
                reservation_prefix: env_or(
                    "TURNSTILE_RESERVATION_PREFIX",
                    api_defaults.reservation_prefix,
                ),
                timeout_ms: env_or("TURNSTILE_TIMEOUT_MS", api_defaults.timeout_ms),
                retry_limit: env_or("TURNSTILE_RETRY_LIMIT", api_defaults.retry_limit),
                backoff_initial_ms: env_or(
                    "TURNSTILE_BACKOFF_INITIAL_MS",
                    api_defaults.backoff_initial_ms,
                ),
                backoff_cap_ms: env_or("TURNSTILE_BACKOFF_CAP_MS", api_defaults.backoff_cap_ms),
            },
            queue: QueueConfig {
                polling_interval_ms: env_or(
                    "TURNSTILE_POLLING_INTERVAL_MS",
                    queue_defaults.polling_interval_ms,
                ),
                fallback_enter_ttl_secs: env_or(
                    "TURNSTILE_FALLBACK_ENTER_TTL_SECS",
                    queue_defaults.fallback_enter_ttl_secs,
                ),
            },
            hold: HoldConfig {
                duration_secs: env_or("TURNSTILE_HOLD_DURATION_SECS", hold_defaults.duration_secs),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
