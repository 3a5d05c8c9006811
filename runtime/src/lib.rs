//! # Turnstile Runtime
//!
//! Store runtime for the Turnstile admission client.
//!
//! The [`store::Store`] owns a reducer's state behind an async `RwLock`,
//! runs the reducer for every dispatched action, executes the returned
//! effects in spawned tasks, and feeds actions produced by effects back into
//! the reducer. Actions produced by effects are also broadcast to observers,
//! which is how callers wait for terminal transitions (e.g. admission
//! granted) without polling state.
//!
//! Cancellable effects are registered under their [`EffectId`] and torn down
//! by `Effect::Cancel`, giving recurring work (status polling, countdown
//! ticks) a single owner and an idempotent stop.
//!
//! ## Example
//!
//! ```ignore
//! use turnstile_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! store.send(Action::Start).await?;
//! let value = store.state(|s| s.some_field.clone()).await;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{RwLock, broadcast};
use tokio::task::AbortHandle;
use turnstile_core::effect::{Effect, EffectId};
use turnstile_core::reducer::Reducer;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action or for idle
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Guard that decrements the pending-effect counter when a task finishes,
/// including when it is aborted.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
        metrics::counter!("store.effects.completed").increment(1);
    }
}

/// Shared store internals. `Store` is a cheap `Arc` handle over this.
struct Inner<S, A, E, R> {
    state: RwLock<S>,
    reducer: R,
    environment: E,
    shutdown: AtomicBool,
    pending_effects: Arc<AtomicUsize>,
    /// Live tasks registered by `Effect::Cancellable`, keyed by effect id.
    cancellations: Mutex<HashMap<EffectId, Vec<AbortHandle>>>,
    /// Actions produced by effects are broadcast to observers.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Inner<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Run the reducer for an action and start its effects.
    async fn dispatch(self: &Arc<Self>, action: A) -> Result<(), StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(StoreError::ShutdownInProgress);
        }

        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        for effect in effects {
            self.start(effect);
        }

        Ok(())
    }

    /// Start a top-level effect. Structural variants are unwrapped here;
    /// anything that does real work is spawned.
    fn start(self: &Arc<Self>, effect: Effect<A>) {
        match effect {
            Effect::None => {},
            Effect::Cancel(id) => self.cancel(id),
            Effect::Cancellable { id, effect } => self.spawn(*effect, Some(id)),
            Effect::Parallel(effects) => {
                for effect in effects {
                    self.start(effect);
                }
            },
            other => self.spawn(other, None),
        }
    }

    /// Spawn an effect in its own task, optionally registering it for
    /// cancellation under `cancel_id`.
    fn spawn(self: &Arc<Self>, effect: Effect<A>, cancel_id: Option<EffectId>) {
        self.pending_effects.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("store.effects.started").increment(1);

        let inner = Arc::clone(self);
        let guard = PendingGuard(Arc::clone(&self.pending_effects));
        let task = tokio::spawn(async move {
            let _guard = guard;
            run_effect(&inner, effect).await;
        });

        if let Some(id) = cancel_id {
            self.register(id, task.abort_handle());
        }
    }

    /// Register a task under an effect id, pruning finished handles.
    fn register(&self, id: EffectId, handle: AbortHandle) {
        let mut map = self
            .cancellations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let handles = map.entry(id).or_default();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Abort every live task registered under an id. No-op for unknown ids,
    /// so repeated cancels are safe.
    fn cancel(&self, id: EffectId) {
        let handles = {
            let mut map = self
                .cancellations
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            map.remove(&id)
        };

        if let Some(handles) = handles {
            for handle in &handles {
                handle.abort();
            }
            metrics::counter!("store.effects.cancelled").increment(handles.len() as u64);
            tracing::debug!(effect_id = %id, count = handles.len(), "cancelled effects");
        }
    }

    /// Feed an action produced by an effect back into the reducer, and
    /// broadcast it to observers.
    async fn feedback(self: &Arc<Self>, action: A) {
        let _ = self.action_broadcast.send(action.clone());

        if let Err(error) = self.dispatch(action).await {
            tracing::debug!(%error, "dropping effect feedback action");
        }
    }
}

/// Execute one effect to completion within the current task.
///
/// Boxed because `Sequential` recurses and feedback actions re-enter the
/// reducer, which may produce further effects.
fn run_effect<'a, S, A, E, R>(
    inner: &'a Arc<Inner<S, A, E, R>>,
    effect: Effect<A>,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    Box::pin(async move {
        match effect {
            Effect::None => {},
            Effect::Parallel(effects) => {
                for effect in effects {
                    inner.start(effect);
                }
            },
            Effect::Sequential(effects) => {
                for effect in effects {
                    run_effect(inner, effect).await;
                }
            },
            Effect::Delay { duration, action } => {
                tokio::time::sleep(duration).await;
                inner.feedback(*action).await;
            },
            Effect::Future(future) => {
                if let Some(action) = future.await {
                    inner.feedback(action).await;
                }
            },
            Effect::Cancellable { id, effect } => {
                inner.spawn(*effect, Some(id));
            },
            Effect::Cancel(id) => inner.cancel(id),
        }
    })
}

/// Store module - the runtime for reducers.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, Duration, HashMap, Inner, Mutex, Ordering, Reducer, RwLock,
        StoreError, broadcast,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    ///
    /// # Concurrency
    ///
    /// - The reducer executes synchronously while holding the state write
    ///   lock, so state checks and flag updates within one `reduce` call are
    ///   atomic with respect to every other action.
    /// - Effects execute asynchronously in spawned tasks; `send()` returns
    ///   after starting them, not after they complete. Use
    ///   [`Store::send_and_wait_for`] or [`Store::wait_idle`] to synchronize.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        inner: Arc<Inner<S, A, E, R>>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment.
        ///
        /// Action broadcast capacity defaults to 16; increase with
        /// [`Store::with_broadcast_capacity`] if observers lag.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
        }

        /// Create a new store with a custom action broadcast capacity.
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity);

            Self {
                inner: Arc::new(Inner {
                    state: RwLock::new(initial_state),
                    reducer,
                    environment,
                    shutdown: AtomicBool::new(false),
                    pending_effects: Arc::new(AtomicUsize::new(0)),
                    cancellations: Mutex::new(HashMap::new()),
                    action_broadcast,
                }),
            }
        }

        /// Send an action to the store.
        ///
        /// Runs the reducer under the state write lock and starts the
        /// returned effects. Returns once effect execution has started.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is
        /// shutting down.
        #[tracing::instrument(skip_all, name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            self.inner.dispatch(action).await
        }

        /// Read state through a closure.
        pub async fn state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
            let state = self.inner.state.read().await;
            f(&state)
        }

        /// Subscribe to actions produced by effects.
        ///
        /// Only feedback actions are broadcast, not the actions passed to
        /// [`Store::send`] directly.
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<A> {
            self.inner.action_broadcast.subscribe()
        }

        /// Number of effects currently running or scheduled.
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.inner.pending_effects.load(Ordering::SeqCst)
        }

        /// Send an action and wait for a matching feedback action.
        ///
        /// Subscribes to the action broadcast BEFORE sending to avoid a race
        /// with fast effects, then returns the first action matching the
        /// predicate.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`] if no matching action arrives in time
        /// - [`StoreError::ChannelClosed`] if the broadcast channel closes
        /// - [`StoreError::ShutdownInProgress`] if the store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "action broadcast lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Wait until no effects are running or scheduled.
        ///
        /// Mainly useful in tests; note that a live polling loop keeps a
        /// delay effect pending, so cancel it first.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Timeout`] if effects are still pending when
        /// the timeout expires.
        pub async fn wait_idle(&self, timeout: Duration) -> Result<(), StoreError> {
            let start = tokio::time::Instant::now();
            loop {
                if self.pending_effects() == 0 {
                    return Ok(());
                }
                if start.elapsed() >= timeout {
                    return Err(StoreError::Timeout);
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }

        /// Initiate graceful shutdown.
        ///
        /// Sets the shutdown flag (rejecting new actions), then waits for
        /// pending effects to complete.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires
        /// with effects still running.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("initiating graceful shutdown");
            self.inner.shutdown.store(true, Ordering::Release);

            let start = tokio::time::Instant::now();
            loop {
                let pending = self.pending_effects();
                if pending == 0 {
                    tracing::info!("all effects completed, shutdown successful");
                    return Ok(());
                }
                if start.elapsed() >= timeout {
                    tracing::error!(pending, "shutdown timed out");
                    return Err(StoreError::ShutdownTimeout(pending));
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

pub use store::Store;
