//! Outbound calls to the upstream API.
//!
//! [`UpstreamClient`] wraps one pooled [`reqwest::Client`] shared by every
//! handler. Connection-level failures come back as [`NetworkError`]; an
//! upstream that answered, whatever the status, comes back as an
//! [`UpstreamResponse`].
//!
//! # Cancellation
//!
//! Dropping the future returned by [`UpstreamClient::forward`] aborts the
//! in-flight request, and dropping the body returned by
//! [`UpstreamResponse::into_body`] closes the upstream connection. Hyper
//! drops both when the browser disconnects, so no upstream call outlives
//! its client.
//!
//! # Timeouts
//!
//! The configured timeout bounds the wait for response headers and each
//! idle gap while reading the body, never the body as a whole, so a long
//! stream that keeps producing data is relayed to the end.

use std::time::Duration;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::{HeaderMap, Method, StatusCode};
use tracing::{debug, warn};

use crate::error::{GatewayError, NetworkError};
use crate::headers::sanitize_response_headers;
use crate::response::{BoxError, GatewayBody};
use crate::types::ProxyConfig;

/// Pooled HTTP client for the upstream service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    response_timeout: Duration,
}

impl UpstreamClient {
    /// Builds a client with the configured timeouts.
    ///
    /// Redirects are not followed: a 3xx from the upstream is relayed to the
    /// browser like any other status. Compressed upstream bodies are decoded
    /// transparently.
    pub fn new(config: &ProxyConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| GatewayError::ConfigError(format!("HTTP client: {err}")))?;
        Ok(Self {
            http,
            response_timeout: config.timeout,
        })
    }

    /// Sends one request to an absolute upstream URL.
    ///
    /// The caller has already resolved `url` from a configured base; an
    /// unconfigured base never reaches this point.
    pub async fn forward(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<UpstreamResponse, NetworkError> {
        debug!(%method, url, "Forwarding to upstream");

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        match tokio::time::timeout(self.response_timeout, request.send()).await {
            Err(_) => {
                warn!(url, timeout = ?self.response_timeout, "Upstream response timed out");
                Err(NetworkError::timeout())
            }
            Ok(Ok(response)) => {
                debug!(status = %response.status(), url, "Upstream responded");
                Ok(UpstreamResponse { inner: response })
            }
            Ok(Err(err)) => {
                warn!(url, error = %err, "Upstream request failed");
                Err(NetworkError::from(err))
            }
        }
    }

    /// POSTs a JSON payload.
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<UpstreamResponse, NetworkError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| NetworkError::new(format!("Failed to encode request: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/json"),
        );

        self.forward(Method::POST, url, headers, Some(Bytes::from(body)))
            .await
    }
}

/// An upstream response whose body has not been read yet.
#[derive(Debug)]
pub struct UpstreamResponse {
    inner: reqwest::Response,
}

impl UpstreamResponse {
    /// Status returned by the upstream.
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Raw upstream headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Upstream headers with transport encodings removed.
    pub fn sanitized_headers(&self) -> HeaderMap {
        sanitize_response_headers(self.inner.headers())
    }

    /// Reads the whole body. Only for small control-plane payloads such as
    /// the login response; proxied bodies go through [`Self::into_body`].
    pub async fn bytes(self) -> Result<Bytes, NetworkError> {
        self.inner.bytes().await.map_err(NetworkError::from)
    }

    /// Relays the body as a stream of frames, never buffering it whole.
    pub fn into_body(self) -> GatewayBody {
        let frames = self
            .inner
            .bytes_stream()
            .map_ok(Frame::data)
            .map_err(|err| Box::new(err) as BoxError);
        StreamBody::new(frames).boxed_unsync()
    }
}
