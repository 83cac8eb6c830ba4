//! Session cookie construction.
//!
//! The cookie is the only authentication state the edge observes. It is
//! always `HttpOnly`, `SameSite=Lax` and `Path=/`; `Secure` follows
//! [`SessionCookieConfig::secure`].

use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::types::SessionCookieConfig;

/// Create the session cookie carrying the upstream token.
///
/// No `Max-Age` or `Expires`: the cookie lives for the browser session.
pub fn session_cookie(config: &SessionCookieConfig, token: &str) -> Cookie<'static> {
    Cookie::build((config.name.clone(), token.to_string()))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Returns true if `value` can be sent as a cookie value unescaped.
///
/// Follows RFC 6265 `cookie-value`: `cookie-octet`s, optionally wrapped in
/// double quotes. Anything else (`;`, `,`, whitespace, controls) would
/// change the meaning of the `Set-Cookie` header.
pub fn is_valid_cookie_value(value: &str) -> bool {
    let inner = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(value);
    inner.bytes().all(is_cookie_octet)
}

fn is_cookie_octet(byte: u8) -> bool {
    matches!(byte, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// Create the removal cookie for the session: empty value, `Max-Age=0`.
pub fn clear_session_cookie(config: &SessionCookieConfig) -> Cookie<'static> {
    Cookie::build((config.name.clone(), ""))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Read the session token from a `Cookie` request header value.
pub fn session_token_from_header<'a>(
    config: &SessionCookieConfig,
    header: &'a str,
) -> Option<&'a str> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == config.name)
        .map(|cookie| cookie.value_raw().unwrap_or_default())
        .filter(|value| !value.is_empty())
}
