//! The core trait for business logic.
//!
//! Reducers are pure functions: `(State, Action, Environment) → Effects`.
//! They contain all business logic and are deterministic and testable.

use crate::effect::Effect;
use smallvec::SmallVec;

/// Effect vector returned by reducers.
///
/// Most actions produce zero to two effects, so a `SmallVec` of four keeps
/// the common case off the heap.
pub type Effects<Action> = SmallVec<[Effect<Action>; 4]>;

/// The Reducer trait - core abstraction for business logic
///
/// # Example
///
/// ```ignore
/// impl Reducer for AdmissionReducer {
///     type State = AdmissionState;
///     type Action = AdmissionAction;
///     type Environment = ProductionAdmissionEnvironment;
///
///     fn reduce(
///         &self,
///         state: &mut AdmissionState,
///         action: AdmissionAction,
///         env: &Self::Environment,
///     ) -> Effects<AdmissionAction> {
///         match action {
///             AdmissionAction::PollTick => {
///                 // Business logic here
///                 smallvec![Effect::None]
///             }
///             _ => smallvec![Effect::None],
///         }
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Reduce an action into state changes and effects
    ///
    /// This is a pure function that:
    /// 1. Validates the action
    /// 2. Updates state in place
    /// 3. Returns effect descriptions to be executed
    ///
    /// The runtime calls this while holding the state write lock, so a
    /// check-and-set performed here is atomic with respect to every other
    /// action - the basis for the at-most-one-in-flight-entry guarantee.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action>;
}
