//! Admission environment: the dependencies the reducer's effects need.

use crate::api::queue::QueueApi;
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Dependencies for the admission reducer.
///
/// Timestamps on tokens are stamped by the queue client itself, so no
/// clock lives here.
pub struct AdmissionEnvironment {
    queue: Arc<dyn QueueApi>,
    session: Arc<SessionStore>,
    polling_interval: Duration,
}

impl AdmissionEnvironment {
    /// Assemble an environment.
    #[must_use]
    pub fn new(
        queue: Arc<dyn QueueApi>,
        session: Arc<SessionStore>,
        polling_interval: Duration,
    ) -> Self {
        Self {
            queue,
            session,
            polling_interval,
        }
    }

    /// Queue API handle, cloneable into effects.
    #[must_use]
    pub fn queue(&self) -> Arc<dyn QueueApi> {
        Arc::clone(&self.queue)
    }

    /// Shared session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Delay between status polls.
    #[must_use]
    pub const fn polling_interval(&self) -> Duration {
        self.polling_interval
    }
}
