//! Environment variable names used throughout SessionGate configuration

/// Upstream service
pub const API_BASE_URL: &str = "API_BASE_URL";
pub const UPSTREAM_LOGIN_PATH: &str = "UPSTREAM_LOGIN_PATH";

/// Proxy behavior configuration
pub const PROXY_TIMEOUT_SECS: &str = "PROXY_TIMEOUT_SECS";
pub const PROXY_CONNECT_TIMEOUT_SECS: &str = "PROXY_CONNECT_TIMEOUT_SECS";
pub const PROXY_ALLOWED_PATH_PREFIXES: &str = "PROXY_ALLOWED_PATH_PREFIXES";
pub const MAX_LOGIN_BODY_KB: &str = "MAX_LOGIN_BODY_KB";

/// Session cookie
pub const SESSION_COOKIE_NAME: &str = "SESSION_COOKIE_NAME";
pub const SESSION_COOKIE_SECURE: &str = "SESSION_COOKIE_SECURE";

/// Connection management
pub const MAX_CONNECTIONS: &str = "MAX_CONNECTIONS";

/// Get all environment variable names for documentation/validation
pub fn all_env_vars() -> &'static [&'static str] {
    &[
        API_BASE_URL,
        UPSTREAM_LOGIN_PATH,
        PROXY_TIMEOUT_SECS,
        PROXY_CONNECT_TIMEOUT_SECS,
        PROXY_ALLOWED_PATH_PREFIXES,
        MAX_LOGIN_BODY_KB,
        SESSION_COOKIE_NAME,
        SESSION_COOKIE_SECURE,
        MAX_CONNECTIONS,
    ]
}
