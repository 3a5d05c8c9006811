//! Cross-page session state.
//!
//! The session store is an injected service, shared by handle rather than
//! reached through a global. It holds authentication, the active queue and
//! reservation tokens, and the visitor's event/seat selection.
//!
//! Persistence is selective: identity and selection survive a restart, but
//! tokens are volatile. A waiting or reservation token restored from disk
//! would have expired server-side anyway, so hydration never resurrects one.

use crate::types::{ReservationToken, WaitingToken};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Mutable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Bearer token attached to authenticated requests.
    pub auth_token: Option<String>,
    /// Identity of the current visitor.
    pub user_id: Option<String>,
    /// Active queue membership token.
    pub waiting_token: Option<WaitingToken>,
    /// Active admission grant.
    pub reservation_token: Option<ReservationToken>,
    /// Id of the reservation currently being held.
    pub current_reservation_id: Option<String>,
    /// Selected event.
    pub selected_event_id: Option<String>,
    /// Selected seat ids.
    pub selected_seats: Vec<String>,
    /// Ticket quantity.
    pub quantity: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            auth_token: None,
            user_id: None,
            waiting_token: None,
            reservation_token: None,
            current_reservation_id: None,
            selected_event_id: None,
            selected_seats: Vec::new(),
            quantity: 1,
        }
    }
}

/// The subset of session state that survives a restart. Tokens are
/// deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Identity of the current visitor.
    pub user_id: Option<String>,
    /// Selected event.
    pub selected_event_id: Option<String>,
    /// Selected seat ids.
    pub selected_seats: Vec<String>,
    /// Ticket quantity.
    pub quantity: u32,
}

/// Storage backend for the persisted session snapshot.
pub trait SessionPersistence: Send + Sync {
    /// Load the last snapshot, if any. Errors degrade to `None`.
    fn load(&self) -> Option<PersistedSession>;
    /// Persist a snapshot. Failures are logged, never surfaced.
    fn save(&self, snapshot: &PersistedSession);
}

/// Persistence that keeps nothing. Used for tests and ephemeral sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

impl SessionPersistence for NoopPersistence {
    fn load(&self) -> Option<PersistedSession> {
        None
    }

    fn save(&self, _snapshot: &PersistedSession) {}
}

/// JSON-file-backed persistence.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Persist snapshots at the given path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionPersistence for JsonFilePersistence {
    fn load(&self) -> Option<PersistedSession> {
        let bytes = std::fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                tracing::warn!(%error, path = %self.path.display(), "discarding corrupt session snapshot");
                None
            }
        }
    }

    fn save(&self, snapshot: &PersistedSession) {
        let result = serde_json::to_vec_pretty(snapshot)
            .map_err(std::io::Error::other)
            .and_then(|bytes| std::fs::write(&self.path, bytes));
        if let Err(error) = result {
            tracing::warn!(%error, path = %self.path.display(), "failed to persist session snapshot");
        }
    }
}

/// Shared, thread-safe session store.
///
/// Construction hydrates identity and selection from the persistence
/// backend; every mutation of a persisted field writes a fresh snapshot.
pub struct SessionStore {
    state: Mutex<SessionState>,
    persistence: Box<dyn SessionPersistence>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store hydrated from the given persistence backend.
    #[must_use]
    pub fn new(persistence: Box<dyn SessionPersistence>) -> Self {
        let mut state = SessionState::default();
        if let Some(persisted) = persistence.load() {
            state.user_id = persisted.user_id;
            state.selected_event_id = persisted.selected_event_id;
            state.selected_seats = persisted.selected_seats;
            state.quantity = persisted.quantity.max(1);
        }
        Self {
            state: Mutex::new(state),
            persistence,
        }
    }

    /// Create a purely in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(NoopPersistence))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &SessionState) {
        self.persistence.save(&PersistedSession {
            user_id: state.user_id.clone(),
            selected_event_id: state.selected_event_id.clone(),
            selected_seats: state.selected_seats.clone(),
            quantity: state.quantity,
        });
    }

    /// A copy of the full current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// The current bearer token, if authenticated.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.lock().auth_token.clone()
    }

    /// Whether a bearer token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().auth_token.is_some()
    }

    /// Replace the bearer token. Not persisted.
    pub fn set_auth_token(&self, token: Option<String>) {
        self.lock().auth_token = token;
    }

    /// The current user id.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.lock().user_id.clone()
    }

    /// Replace the user id.
    pub fn set_user_id(&self, user_id: Option<String>) {
        let mut state = self.lock();
        state.user_id = user_id;
        self.persist(&state);
    }

    /// The active waiting token.
    #[must_use]
    pub fn waiting_token(&self) -> Option<WaitingToken> {
        self.lock().waiting_token.clone()
    }

    /// Replace the waiting token. Not persisted.
    pub fn set_waiting_token(&self, token: Option<WaitingToken>) {
        self.lock().waiting_token = token;
    }

    /// The active reservation token.
    #[must_use]
    pub fn reservation_token(&self) -> Option<ReservationToken> {
        self.lock().reservation_token.clone()
    }

    /// Replace the reservation token. Not persisted.
    pub fn set_reservation_token(&self, token: Option<ReservationToken>) {
        self.lock().reservation_token = token;
    }

    /// The id of the reservation currently held.
    #[must_use]
    pub fn current_reservation_id(&self) -> Option<String> {
        self.lock().current_reservation_id.clone()
    }

    /// Replace the current reservation id. Not persisted.
    pub fn set_current_reservation_id(&self, id: Option<String>) {
        self.lock().current_reservation_id = id;
    }

    /// The visitor's event and seat selection.
    #[must_use]
    pub fn event_selection(&self) -> (Option<String>, Vec<String>, u32) {
        let state = self.lock();
        (
            state.selected_event_id.clone(),
            state.selected_seats.clone(),
            state.quantity,
        )
    }

    /// Replace the event and seat selection.
    pub fn set_event_selection(&self, event_id: Option<String>, seats: Vec<String>, quantity: u32) {
        let mut state = self.lock();
        state.selected_event_id = event_id;
        state.selected_seats = seats;
        state.quantity = quantity.max(1);
        self.persist(&state);
    }

    /// Drop the queue-flow state: waiting token, reservation token, and
    /// reservation id. Identity and selection are untouched.
    pub fn clear_queue_state(&self) {
        let mut state = self.lock();
        state.waiting_token = None;
        state.reservation_token = None;
        state.current_reservation_id = None;
    }

    /// Reset everything, including persisted identity and selection.
    pub fn clear_session(&self) {
        let mut state = self.lock();
        *state = SessionState::default();
        self.persist(&state);
    }
}
