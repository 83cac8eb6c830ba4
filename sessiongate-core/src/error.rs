//! Error types for SessionGate.
//!
//! Every failure a handler can hit maps to one [`GatewayError`] variant, and
//! every variant knows its HTTP status and the JSON message sent back to the
//! browser. Handlers never let a fault escape as an unstructured failure:
//! they end in [`GatewayError::into_response`] instead.

use std::borrow::Cow;

use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::response::{GatewayBody, json_message};

/// Result type alias for SessionGate operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

const TIMEOUT_MESSAGE: &str = "Upstream service timeout";

/// Connection-level failure talking to the upstream service.
///
/// Covers DNS failures, refused connections, timeouts and malformed
/// exchanges. It never carries an upstream HTTP status: a response that
/// arrived, even a 5xx, is not a network error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NetworkError {
    message: String,
}

impl NetworkError {
    /// Creates a network error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The upstream did not answer in time.
    pub fn timeout() -> Self {
        Self::new(TIMEOUT_MESSAGE)
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            TIMEOUT_MESSAGE
        } else if err.is_connect() {
            "Could not connect to upstream service"
        } else if err.is_body() || err.is_decode() {
            "Malformed response from upstream service"
        } else {
            "Upstream service error"
        };
        Self::new(message)
    }
}

/// A non-success status reported by the upstream, relayed as-is.
///
/// The gateway does not invent its own failure taxonomy for upstream
/// semantics: the status and message are whatever the upstream said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upstream responded with {status}: {message}")]
pub struct UpstreamError {
    /// Status code returned by the upstream.
    pub status: StatusCode,
    /// Message extracted from the upstream body.
    pub message: String,
}

impl UpstreamError {
    /// Creates an upstream error from a status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Builds an upstream error from a raw response body.
    ///
    /// Reads a JSON `message` field when present: a string is used directly,
    /// an array of strings is joined with `", "`. Anything else falls back to
    /// the canonical reason phrase of `status`.
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("message")? {
                serde_json::Value::String(message) => Some(message.clone()),
                serde_json::Value::Array(parts) => {
                    let parts: Vec<&str> = parts.iter().filter_map(|p| p.as_str()).collect();
                    (!parts.is_empty()).then(|| parts.join(", "))
                }
                _ => None,
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Upstream request failed")
                    .to_string()
            });

        Self { status, message }
    }
}

/// Unified error type for gateway handlers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required request parameter is absent or empty.
    #[error("Missing required query parameter: {0}")]
    MissingParameter(String),

    /// The proxy target is outside the configured allow-list.
    #[error("Target path not allowed: {0}")]
    PathNotAllowed(String),

    /// The upstream answered with a non-success status.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The upstream could not be reached.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// The credential exchange failed before an upstream verdict was known.
    #[error("Login endpoint unavailable: {0}")]
    LoginUnavailable(String),

    /// A response could not be assembled.
    #[error("Failed to build response: {0}")]
    ResponseBuild(#[from] hyper::http::Error),

    /// No route matches the request path.
    #[error("No route for path: {0}")]
    NotFound(String),

    /// The route exists but not for this method.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
}

impl GatewayError {
    /// Returns the HTTP status code sent to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::PathNotAllowed(_) => StatusCode::FORBIDDEN,
            Self::Upstream(err) => err.status,
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::LoginUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::ResponseBuild(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Returns the message placed in the JSON `{message}` body.
    ///
    /// Upstream and network messages are relayed; login failures collapse
    /// to one fixed message so no exchange detail leaks to the browser.
    pub fn user_message(&self) -> Cow<'_, str> {
        match self {
            Self::ConfigError(detail) => Cow::Borrowed(detail),
            Self::MissingParameter(name) => {
                Cow::Owned(format!("Missing required query parameter: {name}"))
            }
            Self::PathNotAllowed(_) => Cow::Borrowed("Target path is not allowed"),
            Self::Upstream(err) => Cow::Borrowed(&err.message),
            Self::Network(err) => Cow::Borrowed(err.message()),
            Self::LoginUnavailable(_) => Cow::Borrowed("Login endpoint unavailable"),
            Self::ResponseBuild(_) => Cow::Borrowed("Failed to build response"),
            Self::NotFound(_) => Cow::Borrowed("Not found"),
            Self::MethodNotAllowed(_) => Cow::Borrowed("Method not allowed"),
        }
    }

    /// Returns true if this error should be logged at error/warn level.
    ///
    /// Client mistakes and relayed upstream verdicts are expected traffic.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_)
                | Self::Network(_)
                | Self::LoginUnavailable(_)
                | Self::ResponseBuild(_)
        )
    }

    /// Converts the error into a JSON `{message}` response.
    pub fn into_response(self) -> Response<GatewayBody> {
        json_message(self.status_code(), &self.user_message())
    }
}
