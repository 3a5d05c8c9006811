//! Transport-level HTTP contract tests.

#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::json;
use std::sync::Arc;
use turnstile_client::api::transport::Transport;
use turnstile_client::config::ApiConfig;
use turnstile_client::error::{ApiError, UNKNOWN_ERROR};
use turnstile_client::session::SessionStore;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        backoff_initial_ms: 1,
        backoff_cap_ms: 5,
        ..ApiConfig::default()
    }
}

fn transport(server: &MockServer, session: Arc<SessionStore>) -> Transport {
    Transport::new(&config(server), session).unwrap()
}

#[tokio::test]
async fn get_retries_transient_failures_then_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/thing"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // 1 attempt + 2 retries, never more
        .mount(&server)
        .await;

    let transport = transport(&server, Arc::new(SessionStore::in_memory()));
    let result: Result<serde_json::Value, ApiError> = transport.get("/api/v1/thing", &[]).await;

    match result {
        Err(ApiError::Api { status, code, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(code, UNKNOWN_ERROR);
        }
        other => panic!("expected 503 error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_recovers_within_the_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/thing"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/thing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let transport = transport(&server, Arc::new(SessionStore::in_memory()));
    let result: serde_json::Value = transport.get("/api/v1/thing", &[]).await.unwrap();
    assert_eq!(result["ok"], json!(true));
}

#[tokio::test]
async fn post_is_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/thing"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server, Arc::new(SessionStore::in_memory()));
    let result: Result<serde_json::Value, ApiError> =
        transport.post("/api/v1/thing", &json!({}), &[]).await;
    assert!(matches!(result, Err(ApiError::Api { status: 503, .. })));
}

#[tokio::test]
async fn requests_carry_trace_id_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(header_exists("X-Trace-Id"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    session.set_auth_token(Some("tok-123".to_owned()));

    let transport = transport(&server, session);
    let _: serde_json::Value = transport.get("/api/v1/me", &[]).await.unwrap();
}

#[tokio::test]
async fn anonymous_requests_omit_the_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let transport = transport(&server, Arc::new(SessionStore::in_memory()));
    let _: serde_json::Value = transport.get("/api/v1/public", &[]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests
            .iter()
            .all(|r| !r.headers.contains_key("authorization"))
    );
}

#[tokio::test]
async fn mutating_verbs_send_json_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/thing/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/thing/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"patched": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/thing/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server, Arc::new(SessionStore::in_memory()));
    let updated: serde_json::Value = transport
        .put("/api/v1/thing/1", &json!({"name": "a"}), &[])
        .await
        .unwrap();
    assert_eq!(updated["updated"], json!(true));

    let patched: serde_json::Value = transport
        .patch("/api/v1/thing/1", &json!({"name": "b"}), &[])
        .await
        .unwrap();
    assert_eq!(patched["patched"], json!(true));

    transport.delete("/api/v1/thing/1", &[]).await.unwrap();
}

#[tokio::test]
async fn structured_error_envelopes_surface_their_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/thing"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": "IDEMPOTENCY_CONFLICT", "message": "key reused", "trace_id": "t-9"}
        })))
        .mount(&server)
        .await;

    let transport = transport(&server, Arc::new(SessionStore::in_memory()));
    let result: Result<serde_json::Value, ApiError> =
        transport.post("/api/v1/thing", &json!({}), &[]).await;

    match result {
        Err(error) => {
            assert_eq!(error.code(), "IDEMPOTENCY_CONFLICT");
            assert_eq!(error.status(), Some(409));
            assert!(!error.is_transient());
        }
        Ok(_) => panic!("expected a conflict error"),
    }
}
