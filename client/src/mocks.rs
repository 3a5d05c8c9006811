//! Mock implementations for tests and demos.

use crate::api::queue::{AdmissionGrant, JoinGrant, QueueApi};
use crate::error::ApiError;
use crate::types::{QueueStatus, ReservationToken, Sourced, WaitingToken};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted [`QueueApi`] that replays a fixed sequence of status
/// observations and counts calls to each operation.
///
/// Statuses are consumed in order; once exhausted, the last one repeats.
/// An optional artificial delay on `enter` widens the window in which
/// overlapping ready observations can arrive, which is exactly the race the
/// admission machine must collapse to a single entry.
pub struct MockQueueApi {
    statuses: Mutex<Vec<Sourced<QueueStatus>>>,
    cursor: AtomicUsize,
    join_calls: AtomicUsize,
    status_calls: AtomicUsize,
    enter_calls: AtomicUsize,
    leave_calls: AtomicUsize,
    enter_delay: Duration,
    enter_error: Mutex<Option<ApiError>>,
}

impl MockQueueApi {
    /// A mock that always reports a waiting status.
    #[must_use]
    pub fn new() -> Self {
        Self::with_statuses(vec![Sourced::Real(QueueStatus::waiting())])
    }

    /// A mock replaying the given status script.
    #[must_use]
    pub fn with_statuses(statuses: Vec<Sourced<QueueStatus>>) -> Self {
        Self {
            statuses: Mutex::new(statuses),
            cursor: AtomicUsize::new(0),
            join_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            enter_calls: AtomicUsize::new(0),
            leave_calls: AtomicUsize::new(0),
            enter_delay: Duration::ZERO,
            enter_error: Mutex::new(None),
        }
    }

    /// Delay each `enter` call by the given duration.
    #[must_use]
    pub fn with_enter_delay(mut self, delay: Duration) -> Self {
        self.enter_delay = delay;
        self
    }

    /// Make the next `enter` calls fail with the given error.
    #[must_use]
    pub fn with_enter_error(self, error: ApiError) -> Self {
        *lock(&self.enter_error) = Some(error);
        self
    }

    /// Number of join calls observed.
    #[must_use]
    pub fn join_calls(&self) -> usize {
        self.join_calls.load(Ordering::SeqCst)
    }

    /// Number of status calls observed.
    #[must_use]
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Number of enter calls observed.
    #[must_use]
    pub fn enter_calls(&self) -> usize {
        self.enter_calls.load(Ordering::SeqCst)
    }

    /// Number of leave calls observed.
    #[must_use]
    pub fn leave_calls(&self) -> usize {
        self.leave_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockQueueApi {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl QueueApi for MockQueueApi {
    async fn join(&self, _event_id: &str, _user_id: &str) -> Sourced<JoinGrant> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);
        Sourced::Real(JoinGrant {
            waiting_token: WaitingToken::new("wtkn_mock".to_owned(), Utc::now()),
            position_hint: 42,
        })
    }

    async fn status(&self, _token: &WaitingToken) -> Sourced<QueueStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let statuses = lock(&self.statuses);
        let index = self
            .cursor
            .fetch_add(1, Ordering::SeqCst)
            .min(statuses.len().saturating_sub(1));
        statuses
            .get(index)
            .cloned()
            .unwrap_or(Sourced::Fallback(QueueStatus::waiting()))
    }

    async fn enter(&self, _token: &WaitingToken) -> Result<Sourced<AdmissionGrant>, ApiError> {
        self.enter_calls.fetch_add(1, Ordering::SeqCst);
        if !self.enter_delay.is_zero() {
            tokio::time::sleep(self.enter_delay).await;
        }
        if let Some(error) = lock(&self.enter_error).take() {
            return Err(error);
        }
        Ok(Sourced::Real(AdmissionGrant {
            reservation_token: ReservationToken::new("rtkn_mock".to_owned(), 30, Utc::now()),
        }))
    }

    async fn leave(&self, _token: &WaitingToken) {
        self.leave_calls.fetch_add(1, Ordering::SeqCst);
    }
}
