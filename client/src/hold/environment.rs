//! Hold environment.

use crate::session::SessionStore;
use std::sync::Arc;
use turnstile_core::environment::Clock;

/// Hook invoked when the hold expires.
pub type ExpiryHook = Arc<dyn Fn() + Send + Sync>;

/// Dependencies for the hold reducer.
pub struct HoldEnvironment {
    clock: Arc<dyn Clock>,
    session: Arc<SessionStore>,
    on_expire: Option<ExpiryHook>,
}

impl HoldEnvironment {
    /// Assemble an environment.
    #[must_use]
    pub const fn new(clock: Arc<dyn Clock>, session: Arc<SessionStore>) -> Self {
        Self {
            clock,
            session,
            on_expire: None,
        }
    }

    /// Register a hook to run when the hold expires.
    #[must_use]
    pub fn with_expiry_hook(mut self, hook: ExpiryHook) -> Self {
        self.on_expire = Some(hook);
        self
    }

    /// Time source.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Shared session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Run the expiry hook, if any.
    pub fn expired(&self) {
        if let Some(hook) = &self.on_expire {
            hook();
        }
    }
}
