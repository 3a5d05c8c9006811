//! HTTP layer: shared transport plus the queue and reservation clients.

pub mod queue;
pub mod reservations;
pub mod transport;

pub use queue::{AdmissionGrant, JoinGrant, QueueApi, QueueClient};
pub use reservations::{ReservationCreateRequest, ReservationCreated, ReservationsClient};
pub use transport::Transport;
