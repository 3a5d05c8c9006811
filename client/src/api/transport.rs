//! Shared HTTP transport.
//!
//! One place owns timeouts, tracing headers, bearer-token injection, the
//! retry policy, and error decoding; the typed clients above it only know
//! paths and payload shapes.
//!
//! Retry applies to GET requests only. Non-idempotent verbs get exactly one
//! attempt: a reservation create that timed out may still have committed
//! server-side, and replaying it is the backend's job via idempotency keys,
//! not the transport's.

use crate::config::ApiConfig;
use crate::error::{ApiError, ErrorEnvelope, UNKNOWN_ERROR};
use crate::session::SessionStore;
use rand::Rng;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Header carrying the per-request trace id.
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// HTTP transport shared by all typed API clients.
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    retry_limit: u32,
    backoff_initial: Duration,
    backoff_cap: Duration,
}

impl Transport {
    /// Build a transport from config, sharing the given session store for
    /// auth-token lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|error| ApiError::Transport(error.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            session,
            retry_limit: config.retry_limit,
            backoff_initial: config.backoff_initial(),
            backoff_cap: config.backoff_cap(),
        })
    }

    /// GET a JSON resource. Retried on transient failures.
    ///
    /// # Errors
    ///
    /// Returns the final [`ApiError`] once the retry budget is exhausted.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None, headers).await
    }

    /// POST a JSON body. Never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn post<T, B>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.execute(Method::POST, path, Some(body), headers).await
    }

    /// PUT a JSON body. Never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn put<T, B>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.execute(Method::PUT, path, Some(body), headers).await
    }

    /// PATCH a JSON body. Never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn patch<T, B>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.execute(Method::PATCH, path, Some(body), headers).await
    }

    /// DELETE a resource, discarding any response body. Never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn delete(&self, path: &str, headers: &[(&str, &str)]) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None, headers)
            .await
            .map(|_| ())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        headers: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body, headers).await?;
        response
            .json::<T>()
            .await
            .map_err(|error| ApiError::Decode(error.to_string()))
    }

    /// Issue the request, retrying transient failures for GETs, and return
    /// the response once it carries a success status.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        headers: &[(&str, &str)],
    ) -> Result<reqwest::Response, ApiError> {
        let retries = if method == Method::GET {
            self.retry_limit
        } else {
            0
        };

        let mut attempt = 0u32;
        loop {
            match self.attempt(&method, path, body.as_ref(), headers).await {
                Ok(response) => return Ok(response),
                Err(error) if attempt < retries && error.is_transient() => {
                    let delay = self.backoff_delay(attempt);
                    tracing::warn!(%error, attempt, path, ?delay, "transient failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: &[(&str, &str)],
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(TRACE_ID_HEADER, Uuid::new_v4().to_string());

        if let Some(token) = self.session.auth_token() {
            request = request.bearer_auth(token);
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(decode_error(status.as_u16(), &text))
    }

    /// Exponential backoff with full jitter, capped.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self
            .backoff_initial
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.backoff_cap);
        base.mul_f64(rand::thread_rng().gen_range(0.5..=1.0))
    }
}

fn map_reqwest_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(error.to_string())
    }
}

fn decode_error(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::Api {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
            trace_id: envelope.error.trace_id,
        },
        Err(_) => ApiError::Api {
            status,
            code: UNKNOWN_ERROR.to_owned(),
            message: "undecodable error response".to_owned(),
            trace_id: None,
        },
    }
}
