//! Client-side wrapper for calls that ride the session cookie.
//!
//! [`AuthedClient`] behaves like a plain HTTP client except for two things:
//! JSON bodies are framed by one uniform rule, and a 401 never reaches the
//! caller. On 401 the configured [`Navigator`] handles the expiry and the
//! call fails with [`InterceptError::AuthExpired`].
//!
//! # Body framing
//!
//! | `request` | `body`    | Sent body                                   |
//! |-----------|-----------|---------------------------------------------|
//! | `Some(r)` | `Some(b)` | `{"request": r, "body": b}`                 |
//! | `Some(r)` | `None`    | `{"request": r, "body": null}`              |
//! | `None`    | `Some(b)` | `b`                                         |
//! | `None`    | `None`    | no body                                     |

use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::defaults::{AUTH_EXPIRED_STATUS, LOGIN_PAGE};
use crate::error::UpstreamError;
use crate::navigator::Navigator;

/// Failure of an intercepted call.
#[derive(Debug, Error)]
pub enum InterceptError {
    /// The session expired; the navigator has already been invoked.
    #[error("Session expired")]
    AuthExpired,

    /// A non-success status, surfaced by [`AuthedClient::fetch_json`].
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A JSON body could not be encoded or decoded.
    #[error("Invalid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One call's parameters.
#[derive(Debug, Clone)]
pub struct RequestInit {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Request descriptor; when present the body is enveloped.
    pub request: Option<Value>,
    pub body: Option<Value>,
}

impl RequestInit {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            request: None,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_request(mut self, descriptor: Value) -> Self {
        self.request = Some(descriptor);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes the body according to the framing rule.
    pub fn encoded_body(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        match (&self.request, &self.body) {
            (Some(request), body) => {
                serde_json::to_vec(&json!({ "request": request, "body": body })).map(Some)
            }
            (None, Some(body)) => serde_json::to_vec(body).map(Some),
            (None, None) => Ok(None),
        }
    }
}

/// HTTP client that reacts to session expiry.
#[derive(Debug, Clone)]
pub struct AuthedClient<N> {
    http: reqwest::Client,
    navigator: N,
    login_page: String,
}

impl<N: Navigator> AuthedClient<N> {
    pub fn new(navigator: N) -> Self {
        Self::with_client(reqwest::Client::new(), navigator)
    }

    /// Uses an existing client, e.g. one with a cookie store.
    pub fn with_client(http: reqwest::Client, navigator: N) -> Self {
        Self {
            http,
            navigator,
            login_page: LOGIN_PAGE.to_string(),
        }
    }

    /// Overrides the login entry point handed to the navigator.
    pub fn with_login_page(mut self, login_page: impl Into<String>) -> Self {
        self.login_page = login_page.into();
        self
    }

    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    /// Sends the request. Any status but 401 is returned unchanged.
    pub async fn fetch(&self, init: RequestInit) -> Result<reqwest::Response, InterceptError> {
        let body = init.encoded_body()?;
        let RequestInit {
            method,
            url,
            headers,
            ..
        } = init;

        let mut request = self.http.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = request.send().await?;
        if response.status().as_u16() == AUTH_EXPIRED_STATUS {
            debug!(url, "Session expired");
            self.navigator.on_auth_expired(&self.login_page);
            return Err(InterceptError::AuthExpired);
        }

        Ok(response)
    }

    /// Sends the request and decodes a JSON success body.
    ///
    /// Non-success statuses become [`InterceptError::Upstream`] carrying the
    /// upstream's status and message.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        init: RequestInit,
    ) -> Result<T, InterceptError> {
        let response = self.fetch(init).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(UpstreamError::from_body(status, &body).into());
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::REDIRECT_MEMORY_KEY;
    use crate::navigator::{
        BrowserNavigator, InjectedRouterNavigator, Location, MemoryLocation, Router,
    };
    use crate::store::{KeyValueStore, MemoryStore, RedirectMemory};
    use crate::test_utils::spawn_server;
    use bytes::Bytes;
    use http_body_util::{BodyExt, Full};
    use hyper::{Response, StatusCode};
    use serde::Deserialize;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    /// `/expired` → 401, `/fail` → 422 with a message, `/echo` → the request
    /// body and content-type, anything else → `{"id":7}`.
    async fn upstream() -> SocketAddr {
        spawn_server(|req: hyper::Request<hyper::body::Incoming>| async move {
            let path = req.uri().path().to_string();
            match path.as_str() {
                "/expired" => Response::builder()
                    .status(401)
                    .body(Full::new(Bytes::from_static(b"{\"message\":\"expired\"}")))
                    .unwrap(),
                "/fail" => Response::builder()
                    .status(422)
                    .body(Full::new(Bytes::from_static(
                        b"{\"message\":[\"qty required\",\"side invalid\"]}",
                    )))
                    .unwrap(),
                "/echo" => {
                    let content_type = req
                        .headers()
                        .get(CONTENT_TYPE)
                        .map(|v| v.to_str().unwrap().to_string())
                        .unwrap_or_default();
                    let body = req.into_body().collect().await.unwrap().to_bytes();
                    Response::builder()
                        .header("x-echo-content-type", content_type)
                        .body(Full::new(body))
                        .unwrap()
                }
                _ => Response::new(Full::new(Bytes::from_static(b"{\"id\":7}"))),
            }
        })
        .await
    }

    #[derive(Default)]
    struct RecordingRouter {
        pushed: Mutex<Vec<String>>,
    }

    impl Router for RecordingRouter {
        fn push(&self, path: &str) {
            self.pushed.lock().unwrap().push(path.to_string());
        }
    }

    fn router_client() -> (AuthedClient<InjectedRouterNavigator>, Arc<RecordingRouter>) {
        let router = Arc::new(RecordingRouter::default());
        let client = AuthedClient::new(InjectedRouterNavigator::new(router.clone()));
        (client, router)
    }

    // ===========================================
    // Body framing
    // ===========================================

    #[test]
    fn test_envelope_with_descriptor_and_body() {
        let init = RequestInit::post("http://localhost/x")
            .with_request(json!({"op": "place"}))
            .with_body(json!({"qty": 1}));
        let body: Value = serde_json::from_slice(&init.encoded_body().unwrap().unwrap()).unwrap();
        assert_eq!(body, json!({"request": {"op": "place"}, "body": {"qty": 1}}));
    }

    #[test]
    fn test_envelope_with_descriptor_only() {
        let init = RequestInit::post("http://localhost/x").with_request(json!({"op": "list"}));
        let body: Value = serde_json::from_slice(&init.encoded_body().unwrap().unwrap()).unwrap();
        assert_eq!(body, json!({"request": {"op": "list"}, "body": null}));
    }

    #[test]
    fn test_plain_body_and_no_body() {
        let init = RequestInit::post("http://localhost/x").with_body(json!([1, 2]));
        assert_eq!(init.encoded_body().unwrap().unwrap(), b"[1,2]");

        assert!(RequestInit::get("http://localhost/x").encoded_body().unwrap().is_none());
    }

    // ===========================================
    // Interception
    // ===========================================

    #[tokio::test]
    async fn test_401_remembers_location_then_navigates() {
        let addr = upstream().await;
        let store = Arc::new(MemoryStore::new());
        let location = Arc::new(MemoryLocation::new("/trade/positions?x=1"));
        let navigator = BrowserNavigator::new(location.clone(), RedirectMemory::new(store.clone()));
        let client = AuthedClient::new(navigator);

        let result = client.fetch(RequestInit::get(format!("http://{addr}/expired"))).await;

        assert!(matches!(result, Err(InterceptError::AuthExpired)));
        assert_eq!(
            store.get(REDIRECT_MEMORY_KEY).as_deref(),
            Some("/trade/positions?x=1")
        );
        assert_eq!(location.current(), "/auth/login");
    }

    #[tokio::test]
    async fn test_401_with_router_navigator() {
        let addr = upstream().await;
        let (client, router) = router_client();
        let client = client.with_login_page("/signin");
        assert_eq!(client.login_page(), "/signin");

        let result = client.fetch(RequestInit::get(format!("http://{addr}/expired"))).await;

        assert!(matches!(result, Err(InterceptError::AuthExpired)));
        assert_eq!(*router.pushed.lock().unwrap(), vec!["/signin"]);
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through() {
        let addr = upstream().await;
        let (client, router) = router_client();

        let response = client
            .fetch(RequestInit::get(format!("http://{addr}/fail")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = client
            .fetch(RequestInit::get(format!("http://{addr}/ok")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(router.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_envelope_reaches_server_as_json() {
        let addr = upstream().await;
        let (client, _) = router_client();

        let response = client
            .fetch(
                RequestInit::post(format!("http://{addr}/echo"))
                    .with_request(json!({"op": "place"}))
                    .with_body(json!({"qty": 3})),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("x-echo-content-type").unwrap(),
            "application/json"
        );
        let echoed: Value = response.json().await.unwrap();
        assert_eq!(echoed, json!({"request": {"op": "place"}, "body": {"qty": 3}}));
    }

    #[derive(Debug, Deserialize)]
    struct Order {
        id: u64,
    }

    #[tokio::test]
    async fn test_fetch_json_success() {
        let addr = upstream().await;
        let (client, _) = router_client();

        let order: Order = client
            .fetch_json(RequestInit::get(format!("http://{addr}/orders/7")))
            .await
            .unwrap();
        assert_eq!(order.id, 7);
    }

    #[tokio::test]
    async fn test_fetch_json_upstream_error() {
        let addr = upstream().await;
        let (client, _) = router_client();

        let err = client
            .fetch_json::<Order>(RequestInit::get(format!("http://{addr}/fail")))
            .await
            .unwrap_err();

        match err {
            InterceptError::Upstream(err) => {
                assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(err.message, "qty required, side invalid");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error() {
        let (client, router) = router_client();
        let err = client
            .fetch(RequestInit::get("http://127.0.0.1:9/unreachable"))
            .await
            .unwrap_err();
        assert!(matches!(err, InterceptError::Transport(_)));
        assert!(router.pushed.lock().unwrap().is_empty());
    }
}
