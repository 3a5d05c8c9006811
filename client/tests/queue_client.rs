//! Queue client behavior against a mocked gateway, including the
//! degrade-gracefully fallback paths.

#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::json;
use std::sync::Arc;
use turnstile_client::api::queue::{QueueApi, QueueClient};
use turnstile_client::api::transport::Transport;
use turnstile_client::config::ApiConfig;
use turnstile_client::error::ApiError;
use turnstile_client::session::SessionStore;
use turnstile_client::types::{QueueState, WaitingToken};
use turnstile_core::environment::SystemClock;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base_url: String) -> QueueClient {
    let config = ApiConfig {
        base_url,
        timeout_ms: 1_000,
        backoff_initial_ms: 1,
        backoff_cap_ms: 5,
        ..ApiConfig::default()
    };
    let transport =
        Arc::new(Transport::new(&config, Arc::new(SessionStore::in_memory())).unwrap());
    QueueClient::new(transport, Arc::new(SystemClock), 30)
}

fn token() -> WaitingToken {
    WaitingToken::new("wtkn_test".to_owned(), chrono::Utc::now())
}

#[tokio::test]
async fn join_returns_real_grant_and_sends_idempotency_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/queue/join"))
        .and(header_exists("Idempotency-Key"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "waiting_token": "wtkn_real_1",
            "position_hint": 512
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let grant = client.join("evt-1", "user-1").await;

    assert!(!grant.is_fallback());
    assert_eq!(grant.value().waiting_token.value(), "wtkn_real_1");
    assert_eq!(grant.value().position_hint, 512);
}

#[tokio::test]
async fn join_falls_back_when_the_backend_is_unreachable() {
    // Nothing listens here; connections are refused immediately.
    let client = client_for("http://127.0.0.1:9".to_owned());
    let grant = client.join("evt-1", "user-1").await;

    assert!(grant.is_fallback());
    assert!(grant.value().waiting_token.value().starts_with("wtkn_fallback_"));
    assert!((1..=1000).contains(&grant.value().position_hint));
}

#[tokio::test]
async fn status_decodes_the_wire_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/queue/status"))
        .and(query_param("token", "wtkn_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "waiting",
            "position": 37,
            "eta_sec": 74,
            "waiting_time": 12,
            "ready_for_entry": false
        })))
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let status = client.status(&token()).await;

    assert!(!status.is_fallback());
    assert_eq!(status.value().state, QueueState::Waiting);
    assert_eq!(status.value().position, Some(37));
    assert_eq!(status.value().eta_seconds, Some(74));
    assert!(!status.value().admits_entry());
}

#[tokio::test]
async fn status_falls_back_to_a_waiting_observation() {
    let client = client_for("http://127.0.0.1:9".to_owned());
    let status = client.status(&token()).await;

    assert!(status.is_fallback());
    assert_eq!(status.value().state, QueueState::Waiting);
    assert!(!status.value().admits_entry());
    let eta = status.value().eta_seconds.unwrap();
    assert!((5..=60).contains(&eta));
}

#[tokio::test]
async fn enter_degrades_transient_failures_to_a_fallback_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/queue/enter"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1) // POST, so no retry
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let grant = client.enter(&token()).await.unwrap();

    assert!(grant.is_fallback());
    let reservation = &grant.value().reservation_token;
    assert!(reservation.value().starts_with("rtkn_fallback_"));
    assert_eq!(reservation.ttl_seconds(), 30);
}

#[tokio::test]
async fn enter_surfaces_domain_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/queue/enter"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": "QUEUE_TOKEN_INVALID", "message": "token expired"}
        })))
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let result = client.enter(&token()).await;

    match result {
        Err(ApiError::Api { code, status, .. }) => {
            assert_eq!(code, "QUEUE_TOKEN_INVALID");
            assert_eq!(status, 409);
        }
        other => panic!("expected a domain error, got {other:?}"),
    }
}

#[tokio::test]
async fn enter_returns_a_real_grant_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/queue/enter"))
        .and(header_exists("Idempotency-Key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admission": "granted",
            "reservation_token": "rtkn_real_1",
            "ttl_sec": 30
        })))
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let grant = client.enter(&token()).await.unwrap();

    assert!(!grant.is_fallback());
    assert_eq!(grant.value().reservation_token.value(), "rtkn_real_1");
    assert_eq!(grant.value().reservation_token.ttl_seconds(), 30);
}

#[tokio::test]
async fn leave_is_fire_and_forget() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/queue/leave"))
        .and(query_param("token", "wtkn_test"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    // Swallows the failure; nothing to assert beyond not panicking and the
    // request having been made.
    let client = client_for(server.uri());
    client.leave(&token()).await;
}
