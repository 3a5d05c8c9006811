//! Store wiring for the admission machine.

use super::environment::AdmissionEnvironment;
use super::reducer::AdmissionReducer;
use super::{actions::AdmissionAction, types::AdmissionState};
use turnstile_runtime::Store;

/// Store type driving the admission flow.
pub type AdmissionStore = Store<AdmissionState, AdmissionAction, AdmissionEnvironment, AdmissionReducer>;

/// Create an admission store in the idle phase.
#[must_use]
pub fn admission_store(environment: AdmissionEnvironment) -> AdmissionStore {
    Store::new(AdmissionState::default(), AdmissionReducer, environment)
}
