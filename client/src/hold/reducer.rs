//! The hold countdown reducer.

use super::environment::HoldEnvironment;
use super::types::{HOLD_TICK_EFFECT, HoldAction, HoldState};
use smallvec::smallvec;
use std::time::Duration;
use turnstile_core::effect::Effect;
use turnstile_core::reducer::{Effects, Reducer};

const TICK: Duration = Duration::from_secs(1);

/// Pure state machine for the hold countdown.
pub struct HoldReducer;

impl HoldReducer {
    fn schedule_tick() -> Effect<HoldAction> {
        Effect::cancellable(
            HOLD_TICK_EFFECT,
            Effect::Delay {
                duration: TICK,
                action: Box::new(HoldAction::Tick),
            },
        )
    }
}

impl Reducer for HoldReducer {
    type State = HoldState;
    type Action = HoldAction;
    type Environment = HoldEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            HoldAction::Start { duration_secs } => {
                state.duration = duration_secs;
                state.remaining = duration_secs;
                state.running = duration_secs > 0;
                state.expired = false;
                state.started_at = Some(env.clock().now());
                if !state.running {
                    return smallvec![Effect::None];
                }
                // Cancel first so a restart replaces any previous schedule.
                smallvec![Effect::Cancel(HOLD_TICK_EFFECT), Self::schedule_tick()]
            }

            HoldAction::Tick => {
                // A tick that raced a cancel; drop it.
                if !state.running {
                    return smallvec![Effect::None];
                }
                state.remaining = state.remaining.saturating_sub(1);
                if state.remaining > 0 {
                    return smallvec![Self::schedule_tick()];
                }
                state.running = false;
                state.expired = true;
                tracing::info!("reservation hold expired");
                env.session().clear_queue_state();
                env.expired();
                smallvec![Effect::Cancel(HOLD_TICK_EFFECT)]
            }

            HoldAction::Cancel => {
                state.running = false;
                smallvec![Effect::Cancel(HOLD_TICK_EFFECT)]
            }
        }
    }
}
