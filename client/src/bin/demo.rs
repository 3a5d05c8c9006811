//! End-to-end demo of the admission flow.
//!
//! Joins the queue for a demo event, waits for admission (driven by the
//! polling schedule), creates a reservation hold, and runs the countdown
//! for a few seconds before leaving.
//!
//! Point `TURNSTILE_API_BASE` at a live gateway; without one, the fallback
//! path still carries the flow to an admission grant.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use turnstile_client::admission::{AdmissionAction, AdmissionEnvironment, admission_store};
use turnstile_client::api::queue::QueueClient;
use turnstile_client::api::reservations::{ReservationCreateRequest, ReservationsClient};
use turnstile_client::api::transport::Transport;
use turnstile_client::hold::{HoldAction, HoldEnvironment, hold_store};
use turnstile_client::session::SessionStore;
use turnstile_client::Config;
use turnstile_core::environment::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let session = Arc::new(SessionStore::in_memory());
    session.set_user_id(Some("demo-user".to_owned()));
    session.set_event_selection(Some("evt_2025_1001".to_owned()), vec![], 2);

    let transport = Arc::new(Transport::new(&config.api, Arc::clone(&session))?);
    let clock = Arc::new(SystemClock);
    let queue = Arc::new(QueueClient::new(
        Arc::clone(&transport),
        clock.clone(),
        config.queue.fallback_enter_ttl_secs,
    ));
    let reservations = ReservationsClient::new(
        Arc::clone(&transport),
        config.api.reservation_prefix.clone(),
        Arc::clone(&session),
    );

    let admission = admission_store(AdmissionEnvironment::new(
        queue,
        Arc::clone(&session),
        config.queue.polling_interval(),
    ));

    tracing::info!("joining queue");
    let outcome = admission
        .send_and_wait_for(
            AdmissionAction::Join {
                event_id: "evt_2025_1001".to_owned(),
                user_id: "demo-user".to_owned(),
            },
            |action| {
                matches!(
                    action,
                    AdmissionAction::EntryGranted { .. } | AdmissionAction::EntryFailed { .. }
                )
            },
            Duration::from_secs(60),
        )
        .await?;

    match outcome {
        AdmissionAction::EntryGranted { grant } => {
            tracing::info!(source = %grant.source(), "admitted");
        }
        other => {
            tracing::warn!(?other, "admission did not complete");
            admission.shutdown(Duration::from_secs(5)).await?;
            return Ok(());
        }
    }

    let (event_id, seats, quantity) = session.event_selection();
    let request = ReservationCreateRequest {
        event_id: event_id.unwrap_or_else(|| "evt_2025_1001".to_owned()),
        seat_ids: seats,
        quantity,
        user_id: session.user_id().unwrap_or_else(|| "demo-user".to_owned()),
    };

    match reservations.create(&request).await {
        Ok(created) => {
            tracing::info!(
                reservation_id = %created.reservation_id,
                hold_expires_at = %created.hold_expires_at,
                "hold created, starting countdown"
            );

            let hold = hold_store(
                HoldEnvironment::new(clock, Arc::clone(&session)).with_expiry_hook(Arc::new(
                    || {
                        tracing::warn!("hold expired before payment");
                    },
                )),
            );
            hold.send(HoldAction::Start {
                duration_secs: config.hold.duration_secs,
            })
            .await?;

            tokio::time::sleep(Duration::from_secs(5)).await;
            let remaining = hold.state(|s| s.remaining).await;
            tracing::info!(remaining, "countdown running, cancelling for demo");
            hold.send(HoldAction::Cancel).await?;
            hold.shutdown(Duration::from_secs(5)).await?;
        }
        Err(error) => {
            tracing::error!(%error, "reservation create failed");
        }
    }

    admission.send(AdmissionAction::Leave).await?;
    admission.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
