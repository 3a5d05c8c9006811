//! The admission reducer.

use super::actions::AdmissionAction;
use super::environment::AdmissionEnvironment;
use super::types::{AdmissionPhase, AdmissionState, POLL_EFFECT};
use crate::types::{QueueState, Sourced, WaitingToken};
use smallvec::smallvec;
use turnstile_core::effect::Effect;
use turnstile_core::reducer::{Effects, Reducer};

/// Pure state machine for the admission flow.
pub struct AdmissionReducer;

impl AdmissionReducer {
    fn schedule_poll(env: &AdmissionEnvironment) -> Effect<AdmissionAction> {
        Effect::cancellable(
            POLL_EFFECT,
            Effect::Delay {
                duration: env.polling_interval(),
                action: Box::new(AdmissionAction::PollTick),
            },
        )
    }

    fn fetch_status(env: &AdmissionEnvironment, token: WaitingToken) -> Effect<AdmissionAction> {
        let queue = env.queue();
        Effect::cancellable(
            POLL_EFFECT,
            Effect::future(async move {
                Some(AdmissionAction::StatusReceived {
                    status: queue.status(&token).await,
                })
            }),
        )
    }

    fn begin_entry(
        state: &mut AdmissionState,
        env: &AdmissionEnvironment,
        token: WaitingToken,
    ) -> Effects<AdmissionAction> {
        state.entry_in_flight = true;
        state.phase = AdmissionPhase::Entering;
        let queue = env.queue();
        smallvec![Effect::future(async move {
            Some(match queue.enter(&token).await {
                Ok(grant) => AdmissionAction::EntryGranted { grant },
                Err(error) => AdmissionAction::EntryFailed {
                    error: error.to_string(),
                },
            })
        })]
    }
}

impl Reducer for AdmissionReducer {
    type State = AdmissionState;
    type Action = AdmissionAction;
    type Environment = AdmissionEnvironment;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            AdmissionAction::Join { event_id, user_id } => {
                // A join while a flow is live is ignored; restarting from a
                // terminal phase begins a fresh flow.
                if !matches!(state.phase, AdmissionPhase::Idle) && !state.phase.is_terminal() {
                    return smallvec![Effect::None];
                }
                *state = AdmissionState::default();
                let queue = env.queue();
                smallvec![Effect::future(async move {
                    Some(AdmissionAction::Joined {
                        grant: queue.join(&event_id, &user_id).await,
                    })
                })]
            }

            AdmissionAction::Joined { grant } => {
                if grant.is_fallback() {
                    tracing::warn!("waiting with a fallback token, admission may be degraded");
                }
                state.phase = AdmissionPhase::Waiting;
                env.session()
                    .set_waiting_token(Some(grant.value().waiting_token.clone()));
                state.waiting_token = Some(grant.map(|g| g.waiting_token));
                smallvec![Self::schedule_poll(env)]
            }

            AdmissionAction::PollTick => {
                let Some(token) = state.waiting_token.as_ref() else {
                    return smallvec![Effect::None];
                };
                if state.phase.is_terminal() {
                    return smallvec![Effect::None];
                }
                state.polls += 1;
                let token = token.value().clone();
                smallvec![Self::fetch_status(env, token), Self::schedule_poll(env)]
            }

            AdmissionAction::StatusReceived { status } => {
                if state.phase.is_terminal() {
                    return smallvec![Effect::None];
                }
                let observation = status.into_value();
                state.last_status = Some(observation.clone());

                if observation.state == QueueState::Expired {
                    tracing::info!("waiting token expired, flow must restart");
                    state.phase = AdmissionPhase::Expired;
                    state.waiting_token = None;
                    state.reservation_token = None;
                    // Releasing the guard here marks any enter still in
                    // flight as stale; its eventual result is discarded.
                    state.entry_in_flight = false;
                    env.session().clear_queue_state();
                    return smallvec![Effect::Cancel(POLL_EFFECT)];
                }

                if observation.admits_entry() {
                    if state.entry_in_flight {
                        // Another ready observation while entry is pending;
                        // the guard keeps this to a single request.
                        return smallvec![Effect::None];
                    }
                    let Some(token) = state.waiting_token.as_ref() else {
                        return smallvec![Effect::None];
                    };
                    state.phase = AdmissionPhase::ReadyForEntry;
                    let token = token.value().clone();
                    return Self::begin_entry(state, env, token);
                }

                // Do not regress the phase while an entry is pending.
                if !state.entry_in_flight {
                    state.phase = AdmissionPhase::Waiting;
                }
                smallvec![Effect::None]
            }

            AdmissionAction::EntryGranted { grant } => {
                // Stale completion: the flow expired or was left while the
                // enter was in flight. The grant must not resurrect it.
                if !state.entry_in_flight {
                    tracing::debug!("discarding entry grant for a finished flow");
                    return smallvec![Effect::None];
                }
                state.entry_in_flight = false;
                state.phase = AdmissionPhase::Entered;
                state.last_error = None;
                tracing::info!(source = %grant.source(), "admission granted");
                env.session()
                    .set_reservation_token(Some(grant.value().reservation_token.clone()));
                state.reservation_token = Some(grant.map(|g| g.reservation_token));
                // Polling has served its purpose.
                smallvec![Effect::Cancel(POLL_EFFECT)]
            }

            AdmissionAction::EntryFailed { error } => {
                if !state.entry_in_flight {
                    tracing::debug!(%error, "discarding entry failure for a finished flow");
                    return smallvec![Effect::None];
                }
                tracing::warn!(%error, "entry attempt failed");
                state.entry_in_flight = false;
                state.last_error = Some(error);
                if state.phase == AdmissionPhase::Entering {
                    // Polling is still live; a later ready observation will
                    // retry entry.
                    state.phase = AdmissionPhase::ReadyForEntry;
                }
                smallvec![Effect::None]
            }

            AdmissionAction::Leave => {
                let token = state.waiting_token.take().map(Sourced::into_value);
                *state = AdmissionState::default();
                env.session().clear_queue_state();
                let mut effects: Effects<AdmissionAction> = smallvec![Effect::Cancel(POLL_EFFECT)];
                if let Some(token) = token {
                    let queue = env.queue();
                    effects.push(Effect::future(async move {
                        queue.leave(&token).await;
                        None
                    }));
                }
                effects
            }
        }
    }
}
