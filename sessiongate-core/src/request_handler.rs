//! HTTP request routing.
//!
//! This module dispatches incoming requests to the edge handlers.
//!
//! # Routes
//!
//! | Method | Path               | Handler                          |
//! |--------|--------------------|----------------------------------|
//! | POST   | `/api/auth/login`  | [`handlers::login`]              |
//! | POST   | `/api/auth/logout` | [`handlers::logout`]             |
//! | GET    | `/api/proxy`       | [`handlers::proxy_get`]          |
//!
//! A known path with another method gets 405 with an `Allow` header; any
//! other path gets 404. Both are JSON `{message}` bodies like every other
//! gateway-authored response.
//!
//! # Connection Pooling
//!
//! The module accepts a shared [`UpstreamClient`] for HTTP connection
//! pooling, configured by the caller with the proxy timeouts.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use hyper::body::Body;
use hyper::header::{ALLOW, HeaderValue};
use hyper::{Method, Request, Response};
use tracing::debug;

use crate::defaults::{LOGIN_ROUTE, LOGOUT_ROUTE, PROXY_ROUTE};
use crate::error::GatewayError;
use crate::handlers;
use crate::response::{BoxError, GatewayBody};
use crate::types::ConfigProvider;
use crate::upstream::UpstreamClient;

/// A routable endpoint and the one method it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Logout,
    Proxy,
}

impl Route {
    /// Resolves a request path to a route.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            LOGIN_ROUTE => Some(Self::Login),
            LOGOUT_ROUTE => Some(Self::Logout),
            PROXY_ROUTE => Some(Self::Proxy),
            _ => None,
        }
    }

    /// The method this route accepts.
    pub fn method(self) -> Method {
        match self {
            Self::Login | Self::Logout => Method::POST,
            Self::Proxy => Method::GET,
        }
    }
}

/// Handles an incoming HTTP request.
///
/// # Arguments
///
/// * `req` - The incoming HTTP request
/// * `config` - Configuration provider for all settings
/// * `client` - Upstream client (with connection pooling)
///
/// # Returns
///
/// Always returns `Ok`, with either a handler response or a 404/405 JSON
/// response. Handlers convert their own failures into responses.
pub async fn handle_request<B, C>(
    req: Request<B>,
    config: Arc<C>,
    client: UpstreamClient,
) -> Result<Response<GatewayBody>, Infallible>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<BoxError>,
    C: ConfigProvider + ?Sized,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let Some(route) = Route::from_path(&path) else {
        debug!(%method, path, "No route");
        return Ok(GatewayError::NotFound(path).into_response());
    };

    if method != route.method() {
        debug!(%method, path, "Method not allowed");
        let mut response = GatewayError::MethodNotAllowed(method.to_string()).into_response();
        if let Ok(allow) = HeaderValue::from_str(route.method().as_str()) {
            response.headers_mut().insert(ALLOW, allow);
        }
        return Ok(response);
    }

    let response = match route {
        Route::Login => handlers::login(req, config.as_ref(), &client).await,
        Route::Logout => handlers::logout(req.headers(), config.as_ref()),
        Route::Proxy => handlers::proxy_get(req, config.as_ref(), &client).await,
    };

    debug!(%method, path, status = %response.status(), "Request handled");
    Ok(response)
}
