//! Reservation API client.
//!
//! Creates a seat hold once admission has been granted. Each create sends a
//! fresh idempotency key, and a successful create consumes the reservation
//! token: it is single-use, so the session copy is dropped and the new
//! reservation id recorded in its place.

use crate::api::transport::Transport;
use crate::error::ApiError;
use crate::idempotency::{IDEMPOTENCY_KEY_HEADER, IdempotencyKey};
use crate::session::SessionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Payload for creating a reservation hold.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationCreateRequest {
    /// Event being reserved.
    pub event_id: String,
    /// Specific seats, when seat-level selection applies.
    pub seat_ids: Vec<String>,
    /// Ticket quantity.
    pub quantity: u32,
    /// Reserving user.
    pub user_id: String,
}

/// A successfully created hold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReservationCreated {
    /// Backend id of the reservation.
    pub reservation_id: String,
    /// When the hold lapses server-side.
    pub hold_expires_at: DateTime<Utc>,
}

/// HTTP client for the reservation endpoints.
pub struct ReservationsClient {
    transport: Arc<Transport>,
    prefix: String,
    session: Arc<SessionStore>,
}

impl ReservationsClient {
    /// Build a reservations client over the shared transport.
    #[must_use]
    pub fn new(transport: Arc<Transport>, prefix: String, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            prefix,
            session,
        }
    }

    /// Create a reservation hold.
    ///
    /// On success the session's reservation token is consumed and the new
    /// reservation id recorded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the backend rejects the request; no
    /// fallback applies here, since a fabricated reservation cannot be paid.
    pub async fn create(
        &self,
        request: &ReservationCreateRequest,
    ) -> Result<ReservationCreated, ApiError> {
        let key = IdempotencyKey::generate();
        let created: ReservationCreated = self
            .transport
            .post(&self.prefix, request, &[(IDEMPOTENCY_KEY_HEADER, key.as_str())])
            .await?;

        tracing::info!(reservation_id = %created.reservation_id, "reservation hold created");
        self.session.set_reservation_token(None);
        self.session
            .set_current_reservation_id(Some(created.reservation_id.clone()));
        Ok(created)
    }
}
