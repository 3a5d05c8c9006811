//! Queue API client.
//!
//! The queue endpoints sit on the critical path of every visitor, so this
//! client degrades gracefully instead of failing: transient failures on
//! join and status produce locally synthesized fallback values, tagged via
//! [`Sourced`] and logged loudly. Entry is stricter - transient failures
//! degrade to a short-lived fallback grant, but domain errors (an expired
//! or invalid waiting token) surface to the caller, because a fabricated
//! grant would only fail later at reservation time.

use crate::api::transport::Transport;
use crate::error::ApiError;
use crate::idempotency::{IDEMPOTENCY_KEY_HEADER, IdempotencyKey};
use crate::types::{QueueState, QueueStatus, ReservationToken, Sourced, WaitingToken};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use turnstile_core::environment::Clock;
use uuid::Uuid;

const JOIN_PATH: &str = "/api/v1/queue/join";
const STATUS_PATH: &str = "/api/v1/queue/status";
const ENTER_PATH: &str = "/api/v1/queue/enter";
const LEAVE_PATH: &str = "/api/v1/queue/leave";

/// Result of joining the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGrant {
    /// Queue membership token.
    pub waiting_token: WaitingToken,
    /// Approximate initial position in line.
    pub position_hint: u64,
}

/// Result of a granted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionGrant {
    /// Token authorizing reservation creation.
    pub reservation_token: ReservationToken,
}

/// Queue operations as seen by the admission state machine.
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// Join the queue for an event. Infallible by design: a failed call
    /// yields a fallback grant.
    async fn join(&self, event_id: &str, user_id: &str) -> Sourced<JoinGrant>;

    /// Poll queue status. Infallible by design: a failed call yields a
    /// fallback waiting observation.
    async fn status(&self, token: &WaitingToken) -> Sourced<QueueStatus>;

    /// Attempt entry.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] for non-transient (domain) failures;
    /// transient failures degrade to a fallback grant.
    async fn enter(&self, token: &WaitingToken) -> Result<Sourced<AdmissionGrant>, ApiError>;

    /// Leave the queue. Best effort: failures are logged and swallowed.
    async fn leave(&self, token: &WaitingToken);
}

#[derive(Serialize)]
struct JoinRequest<'a> {
    event_id: &'a str,
    user_id: &'a str,
}

#[derive(Deserialize)]
struct JoinResponse {
    waiting_token: String,
    position_hint: u64,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: QueueState,
    #[serde(default)]
    position: Option<u64>,
    #[serde(default)]
    eta_sec: Option<u64>,
    #[serde(default)]
    waiting_time: Option<u64>,
    #[serde(default)]
    ready_for_entry: Option<bool>,
}

#[derive(Serialize)]
struct EnterRequest<'a> {
    waiting_token: &'a str,
}

#[derive(Deserialize)]
struct EnterResponse {
    reservation_token: String,
    ttl_sec: u64,
}

/// HTTP-backed [`QueueApi`] implementation.
pub struct QueueClient {
    transport: Arc<Transport>,
    clock: Arc<dyn Clock>,
    fallback_enter_ttl_secs: u64,
}

impl QueueClient {
    /// Build a queue client over the shared transport.
    #[must_use]
    pub fn new(
        transport: Arc<Transport>,
        clock: Arc<dyn Clock>,
        fallback_enter_ttl_secs: u64,
    ) -> Self {
        Self {
            transport,
            clock,
            fallback_enter_ttl_secs,
        }
    }

    fn fallback_join_grant(&self) -> JoinGrant {
        JoinGrant {
            waiting_token: WaitingToken::new(
                format!("wtkn_fallback_{}", Uuid::new_v4().simple()),
                self.clock.now(),
            ),
            position_hint: rand::thread_rng().gen_range(1..=1000),
        }
    }

    fn fallback_status() -> QueueStatus {
        QueueStatus {
            eta_seconds: Some(rand::thread_rng().gen_range(5..=60)),
            ..QueueStatus::waiting()
        }
    }

    fn fallback_admission_grant(&self) -> AdmissionGrant {
        AdmissionGrant {
            reservation_token: ReservationToken::new(
                format!("rtkn_fallback_{}", Uuid::new_v4().simple()),
                self.fallback_enter_ttl_secs,
                self.clock.now(),
            ),
        }
    }
}

#[async_trait]
impl QueueApi for QueueClient {
    async fn join(&self, event_id: &str, user_id: &str) -> Sourced<JoinGrant> {
        let key = IdempotencyKey::generate();
        let request = JoinRequest { event_id, user_id };
        let result: Result<JoinResponse, ApiError> = self
            .transport
            .post(JOIN_PATH, &request, &[(IDEMPOTENCY_KEY_HEADER, key.as_str())])
            .await;

        match result {
            Ok(response) => Sourced::Real(JoinGrant {
                waiting_token: WaitingToken::new(response.waiting_token, self.clock.now()),
                position_hint: response.position_hint,
            }),
            Err(error) => {
                tracing::warn!(%error, event_id, "queue join failed, issuing fallback token");
                Sourced::Fallback(self.fallback_join_grant())
            }
        }
    }

    async fn status(&self, token: &WaitingToken) -> Sourced<QueueStatus> {
        let path = format!("{STATUS_PATH}?token={}", token.value());
        let result: Result<StatusResponse, ApiError> = self.transport.get(&path, &[]).await;

        match result {
            Ok(response) => Sourced::Real(QueueStatus {
                state: response.status,
                position: response.position,
                eta_seconds: response.eta_sec,
                waiting_time: response.waiting_time,
                ready_for_entry: response.ready_for_entry.unwrap_or(false),
            }),
            Err(error) => {
                tracing::warn!(%error, "queue status failed, reporting fallback waiting state");
                Sourced::Fallback(Self::fallback_status())
            }
        }
    }

    async fn enter(&self, token: &WaitingToken) -> Result<Sourced<AdmissionGrant>, ApiError> {
        let key = IdempotencyKey::generate();
        let request = EnterRequest {
            waiting_token: token.value(),
        };
        let result: Result<EnterResponse, ApiError> = self
            .transport
            .post(ENTER_PATH, &request, &[(IDEMPOTENCY_KEY_HEADER, key.as_str())])
            .await;

        match result {
            Ok(response) => Ok(Sourced::Real(AdmissionGrant {
                reservation_token: ReservationToken::new(
                    response.reservation_token,
                    response.ttl_sec,
                    self.clock.now(),
                ),
            })),
            Err(error) if error.is_transient() => {
                tracing::warn!(%error, "queue enter failed transiently, issuing fallback grant");
                Ok(Sourced::Fallback(self.fallback_admission_grant()))
            }
            Err(error) => {
                tracing::warn!(%error, "queue enter rejected");
                Err(error)
            }
        }
    }

    async fn leave(&self, token: &WaitingToken) {
        let path = format!("{LEAVE_PATH}?token={}", token.value());
        if let Err(error) = self.transport.delete(&path, &[]).await {
            tracing::debug!(%error, "queue leave failed, ignoring");
        }
    }
}
