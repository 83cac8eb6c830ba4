//! Credential exchange: `POST /api/auth/login`.
//!
//! Relays `{email, password}` to the upstream login endpoint and turns the
//! upstream-issued token into the edge-owned session cookie. Upstream
//! verdicts are relayed verbatim; anything that prevents an upstream
//! verdict collapses into one fixed 502.

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::header::SET_COOKIE;
use hyper::{Request, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::cookies::{is_valid_cookie_value, session_cookie};
use crate::error::{GatewayError, Result, UpstreamError};
use crate::proxy_request::join_url;
use crate::response::{BoxError, GatewayBody, full, json_message_builder, message_body};
use crate::types::{ConfigProvider, LoginRequest, UpstreamLoginResponse};
use crate::upstream::UpstreamClient;

/// Message returned when the upstream accepts credentials without one.
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// Handles a login request. Always produces a well-formed response.
pub async fn login<B, C>(
    req: Request<B>,
    config: &C,
    client: &UpstreamClient,
) -> Response<GatewayBody>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<BoxError>,
    C: ConfigProvider + ?Sized,
{
    match exchange_credentials(req, config, client).await {
        Ok(response) => response,
        Err(err) => {
            if err.is_server_error() {
                warn!(error = %err, "Login failed");
            } else {
                debug!(error = %err, "Login rejected");
            }
            err.into_response()
        }
    }
}

async fn exchange_credentials<B, C>(
    req: Request<B>,
    config: &C,
    client: &UpstreamClient,
) -> Result<Response<GatewayBody>>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<BoxError>,
    C: ConfigProvider + ?Sized,
{
    let base = config.require_upstream_base()?;
    let credentials = read_credentials(req.into_body(), config.proxy_config().max_login_body).await?;

    let url = join_url(base, config.upstream_login_path());
    let upstream = client
        .post_json(&url, &credentials)
        .await
        .map_err(|err| GatewayError::LoginUnavailable(err.to_string()))?;

    let status = upstream.status();
    let body = upstream
        .bytes()
        .await
        .map_err(|err| GatewayError::LoginUnavailable(err.to_string()))?;

    if !status.is_success() {
        return Err(UpstreamError::from_body(status, &body).into());
    }

    let parsed = parse_login_response(&body)?;
    let message = parsed
        .message
        .as_deref()
        .unwrap_or(LOGIN_SUCCESS_MESSAGE);

    let mut builder = json_message_builder(StatusCode::OK);
    match parsed.session_token() {
        Some(token) if !is_valid_cookie_value(token) => {
            return Err(GatewayError::LoginUnavailable(
                "Upstream token is not a valid cookie value".to_string(),
            ));
        }
        Some(token) => {
            let cookie = session_cookie(config.session_cookie_config(), token);
            builder = builder.header(SET_COOKIE, cookie.to_string());
            info!("Login succeeded, session cookie issued");
        }
        None => info!("Login succeeded without a session token"),
    }

    Ok(builder.body(full(message_body(message)))?)
}

/// Reads and decodes the login body, bounded by `limit` bytes.
async fn read_credentials<B>(body: B, limit: usize) -> Result<LoginRequest>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<BoxError>,
{
    let bytes = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|err| GatewayError::LoginUnavailable(format!("Failed to read body: {err}")))?
        .to_bytes();

    serde_json::from_slice(&bytes)
        .map_err(|err| GatewayError::LoginUnavailable(format!("Invalid login body: {err}")))
}

/// An empty success body is a token-less success; anything else must be JSON.
fn parse_login_response(body: &[u8]) -> Result<UpstreamLoginResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UpstreamLoginResponse::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        GatewayError::LoginUnavailable(format!("Malformed upstream login response: {err}"))
    })
}
