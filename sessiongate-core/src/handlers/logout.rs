//! Session invalidation: `POST /api/auth/logout`.
//!
//! Overwrites the session cookie with an empty, immediately expired one,
//! whether or not a session existed. Calling it twice yields the same
//! response twice.

use hyper::header::{COOKIE, SET_COOKIE};
use hyper::{HeaderMap, Response, StatusCode};
use tracing::{debug, error};

use crate::cookies::{clear_session_cookie, session_token_from_header};
use crate::error::Result;
use crate::response::{GatewayBody, full, json_message_builder, message_body};
use crate::types::ConfigProvider;

/// Message returned once the cookie is cleared.
pub const LOGOUT_MESSAGE: &str = "Logged out";

/// Handles a logout request. Always produces a well-formed response.
pub fn logout<C>(headers: &HeaderMap, config: &C) -> Response<GatewayBody>
where
    C: ConfigProvider + ?Sized,
{
    clear_session(headers, config).unwrap_or_else(|err| {
        if err.is_server_error() {
            error!(error = %err, "Logout failed");
        }
        err.into_response()
    })
}

fn clear_session<C>(headers: &HeaderMap, config: &C) -> Result<Response<GatewayBody>>
where
    C: ConfigProvider + ?Sized,
{
    config.require_upstream_base()?;

    let session = config.session_cookie_config();
    let had_session = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| session_token_from_header(session, value).is_some());
    debug!(had_session, "Clearing session cookie");

    Ok(json_message_builder(StatusCode::OK)
        .header(SET_COOKIE, clear_session_cookie(session).to_string())
        .body(full(message_body(LOGOUT_MESSAGE)))?)
}
