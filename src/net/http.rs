//! Bearer-token HTTP transport for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every request re-reads the session's effective token, so a login that has
//! expired or been cleared is never sent. A 401/403 response clears the
//! session and forces navigation to the auth entry route; the request still
//! fails with a normalized message for the caller to show.
//!
//! ERROR HANDLING
//! ==============
//! Failures collapse to one human-readable message. Preference order: a
//! string payload, then a `message` field on a structured payload, then the
//! low-level error text, then a generic fallback. No retries happen here.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ClientConfig, normalize_base_url};
use crate::router::location::{Location, REDIRECT_PARAM};
use crate::router::navigator::Navigator;
use crate::router::routes::same_path;
use crate::state::session::SessionHandle;

pub const GENERIC_FAILURE_MESSAGE: &str = "request failed, please try again later";

/// Errors produced by backend requests.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401/403: the session has already been cleared.
    #[error("{message}")]
    Unauthorized { status: u16, message: String },
    /// Any other non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The fixed per-request deadline elapsed.
    #[error("request timed out")]
    Timeout,
    /// Connection-level failure.
    #[error("{0}")]
    Transport(String),
    /// A success response whose body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Human-readable message for display.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Timeout;
        }
        let message = e.to_string();
        Self::Transport(if message.is_empty() { GENERIC_FAILURE_MESSAGE.to_owned() } else { message })
    }
}

/// Pick the user-facing message for a failed response body.
#[must_use]
pub fn normalize_error_message(body: &str, low_level: Option<&str>) -> String {
    let from_payload = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(text)) => Some(text),
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned),
        Ok(_) => None,
        // Plain-text bodies are string payloads too.
        Err(_) => Some(body.trim().to_owned()),
    };

    from_payload
        .filter(|text| !text.trim().is_empty())
        .or_else(|| low_level.filter(|text| !text.is_empty()).map(str::to_owned))
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_owned())
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
    auth_entry: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("auth_entry", &self.auth_entry)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(
        config: &ClientConfig,
        session: SessionHandle,
        navigator: Arc<dyn Navigator>,
        auth_entry: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(&config.api_base_url),
            timeout: config.request_timeout,
            session,
            navigator,
            auth_entry: auth_entry.into(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path?query`, decoding the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// undecodable body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        let request = self.client.request(Method::GET, self.url(path)).query(query);
        self.send(request).await
    }

    /// `POST path?query` with an optional JSON body, decoding the JSON reply.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// undecodable body.
    pub async fn post<B, T>(&self, path: &str, query: &[(&str, &str)], body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.request(Method::POST, self.url(path)).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = self.authorize(request).timeout(self.timeout);
        let response = request.send().await.map_err(|e| ApiError::from_reqwest(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::from_reqwest(&e))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()));
        }

        let low_level = format!("request failed with status {}", status.as_u16());
        let message = normalize_error_message(&body, Some(&low_level));
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            self.handle_unauthorized(status);
            return Err(ApiError::Unauthorized { status: status.as_u16(), message });
        }
        Err(ApiError::Status { status: status.as_u16(), message })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.session.lock().token().map(str::to_owned);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn handle_unauthorized(&self, status: StatusCode) {
        tracing::warn!(status = status.as_u16(), "authorization failure; clearing session");
        self.session.lock().clear_auth();

        let current = Location::parse(&self.navigator.current_location());
        if same_path(&current.path, &self.auth_entry) {
            return;
        }
        let target = Location::new(self.auth_entry.clone()).with_query(REDIRECT_PARAM, &current.full_path());
        self.navigator.force_navigate(&target.full_path());
    }
}
