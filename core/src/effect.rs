//! Side effect descriptions.
//!
//! Effects are NOT executed when a reducer returns them. They are values
//! describing what should happen, executed later by the store runtime. This
//! keeps reducers pure and lets tests assert on the effects themselves.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Identifier for a cancellable effect.
///
/// Recurring work (a polling loop, a countdown tick chain) is scheduled
/// under a stable id so a later [`Effect::Cancel`] can tear down every task
/// registered under it. Ids are `&'static str` by convention, declared as
/// constants next to the reducer that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(&'static str);

impl EffectId {
    /// Create a new effect id.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The underlying name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Effect type - describes a side effect to be executed.
///
/// # Type Parameters
///
/// - `Action`: the action type that effects can produce (feedback loop)
#[allow(missing_docs)]
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// Run effects in parallel
    Parallel(Vec<Effect<Action>>),

    /// Run effects sequentially
    Sequential(Vec<Effect<Action>>),

    /// Delayed action (for poll intervals, countdown ticks, timeouts)
    Delay {
        /// How long to wait
        duration: Duration,
        /// Action to dispatch after delay
        action: Box<Action>,
    },

    /// Arbitrary async computation
    ///
    /// Returns `Option<Action>` - if Some, the action is fed back into the
    /// reducer
    Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

    /// An effect whose spawned task is registered under `id` so it can be
    /// aborted later with [`Effect::Cancel`]
    Cancellable {
        /// Registration id for later cancellation
        id: EffectId,
        /// The effect to execute
        effect: Box<Effect<Action>>,
    },

    /// Abort every live task registered under the id
    ///
    /// Cancelling an id with no registered tasks is a no-op, which makes
    /// repeated stop calls safe.
    Cancel(EffectId),
}

// Manual Debug implementation since Future doesn't implement Debug
impl<Action> std::fmt::Debug for Effect<Action>
where
    Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Parallel(effects) => {
                f.debug_tuple("Effect::Parallel").field(effects).finish()
            },
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
            Effect::Delay { duration, action } => f
                .debug_struct("Effect::Delay")
                .field("duration", duration)
                .field("action", action)
                .finish(),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            Effect::Cancellable { id, effect } => f
                .debug_struct("Effect::Cancellable")
                .field("id", id)
                .field("effect", effect)
                .finish(),
            Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
        }
    }
}

impl<Action> Effect<Action> {
    /// Box an async computation into an [`Effect::Future`].
    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Option<Action>> + Send + 'static,
    {
        Effect::Future(Box::pin(fut))
    }

    /// Wrap an effect so its tasks are registered under `id`.
    #[must_use]
    pub fn cancellable(id: EffectId, effect: Self) -> Self {
        Effect::Cancellable {
            id,
            effect: Box::new(effect),
        }
    }

    /// Combine effects to run in parallel
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Chain effects to run sequentially
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Ping,
    }

    #[test]
    fn effect_id_equality() {
        const POLL: EffectId = EffectId::new("test.poll");
        assert_eq!(POLL, EffectId::new("test.poll"));
        assert_ne!(POLL, EffectId::new("test.tick"));
        assert_eq!(POLL.to_string(), "test.poll");
    }

    #[test]
    fn debug_formats_without_future_contents() {
        let effect: Effect<TestAction> = Effect::future(async { Some(TestAction::Ping) });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");

        let cancel: Effect<TestAction> = Effect::Cancel(EffectId::new("test.poll"));
        assert!(format!("{cancel:?}").contains("test.poll"));
    }

    #[test]
    fn merge_and_chain_wrap_effects() {
        let merged: Effect<TestAction> = Effect::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(merged, Effect::Parallel(ref v) if v.len() == 2));

        let chained: Effect<TestAction> = Effect::chain(vec![Effect::None]);
        assert!(matches!(chained, Effect::Sequential(ref v) if v.len() == 1));
    }
}
