//! Default configuration values and fixed route paths for SessionGate.
//!
//! This module centralizes all default values used throughout SessionGate,
//! ensuring consistency between production code and tests.

use std::time::Duration;

/// Gateway route for the credential exchange.
pub const LOGIN_ROUTE: &str = "/api/auth/login";

/// Gateway route for session invalidation.
pub const LOGOUT_ROUTE: &str = "/api/auth/logout";

/// Gateway route for the generic GET proxy.
pub const PROXY_ROUTE: &str = "/api/proxy";

/// Query parameter naming the upstream path on [`PROXY_ROUTE`].
pub const TARGET_PATH_PARAM: &str = "targetPath";

/// Default upstream endpoint receiving `{email, password}`.
pub const UPSTREAM_LOGIN_PATH: &str = "/auth/login";

/// Default session cookie name.
pub const SESSION_COOKIE_NAME: &str = "token";

/// Session cookies are `Secure` unless explicitly disabled.
pub const SESSION_COOKIE_SECURE: bool = true;

/// Default proxy timeout in seconds.
pub const PROXY_TIMEOUT_SECS: u64 = 30;

/// Default proxy timeout duration.
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(PROXY_TIMEOUT_SECS);

/// Default upstream connect timeout in seconds.
pub const PROXY_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default upstream connect timeout duration.
pub const PROXY_CONNECT_TIMEOUT: Duration = Duration::from_secs(PROXY_CONNECT_TIMEOUT_SECS);

/// Default maximum login body size in kilobytes.
pub const MAX_LOGIN_BODY_KB: usize = 64;

/// Default maximum login body size in bytes.
pub const MAX_LOGIN_BODY: usize = MAX_LOGIN_BODY_KB * 1024;

/// Default maximum concurrent connections.
pub const MAX_CONNECTIONS: usize = 10_000;

/// Grace period for in-flight connections on shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Status code signalling an expired session to the client.
pub const AUTH_EXPIRED_STATUS: u16 = 401;

/// Client-side login entry point.
pub const LOGIN_PAGE: &str = "/auth/login";

/// Store key under which the redirect memory is persisted.
pub const REDIRECT_MEMORY_KEY: &str = "redirectAfterLogin";

/// Location the login flow returns to when no redirect was remembered.
pub const DEFAULT_REDIRECT: &str = "/";
