//! Configuration management for SessionGate.
//!
//! This module handles loading and caching configuration from environment variables.
//! All configurations are computed once at first access and cached for the lifetime
//! of the application using `once_cell::sync::Lazy`.
//!
//! # Caching
//!
//! Configuration values are read from environment variables only once, at startup.
//! Invalid values are logged and replaced by defaults; nothing here aborts the
//! process. A missing upstream base URL is not fatal either: the handlers report
//! it per request.
//!
//! # Example
//!
//! ```
//! use sessiongate::config;
//!
//! let proxy_config = config::get_proxy_config();
//! println!("Timeout: {:?}", proxy_config.timeout);
//!
//! match config::get_upstream_base_url() {
//!     Some(url) => println!("Upstream: {url}"),
//!     None => println!("Upstream not configured"),
//! }
//! ```

use std::env::{self, VarError};
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::env_vars;
use sessiongate_core::defaults;
use sessiongate_core::{
    ConnectionProvider, ProxyConfig, SessionCookieConfig, SessionProvider, UpstreamProvider,
};

// ============================================================================
// Cached Configuration (computed once at first access)
// ============================================================================

static UPSTREAM_BASE_URL: Lazy<Option<String>> =
    Lazy::new(|| compute_upstream_base_url(&|key: &str| env::var(key)));
static UPSTREAM_LOGIN_PATH: Lazy<String> =
    Lazy::new(|| compute_upstream_login_path(&|key: &str| env::var(key)));
static PROXY_CONFIG: Lazy<ProxyConfig> =
    Lazy::new(|| compute_proxy_config(&|key: &str| env::var(key)));
static SESSION_COOKIE_CONFIG: Lazy<SessionCookieConfig> =
    Lazy::new(|| compute_session_cookie_config(&|key: &str| env::var(key)));
static MAX_CONNECTIONS: Lazy<usize> =
    Lazy::new(|| compute_max_connections(&|key: &str| env::var(key)));

// ============================================================================
// Internal Helpers
// ============================================================================

/// Parses an environment variable with fallback to a default value.
///
/// Logs a warning if the value exists but cannot be parsed.
fn parse_env_var_or_default<T, F>(env_var: &F, var_name: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Result<String, VarError>,
{
    match env_var(var_name) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = var_name, value = %value, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Parses a boolean flag, accepting `true/false`, `1/0`, `yes/no` and `on/off`.
fn parse_bool_or_default<F>(env_var: &F, var_name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match env_var(var_name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                warn!(var = var_name, value = %value, "Invalid boolean value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Parses a comma-separated string into a Vec of trimmed strings.
///
/// Filters out empty entries after trimming.
fn parse_comma_separated(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Validates an upstream base URL.
///
/// Returns `None` (with a warning for non-empty input) unless the value is an
/// absolute `http` or `https` URL with a host.
///
/// # Example
///
/// ```
/// use sessiongate::config::validate_base_url;
///
/// assert_eq!(
///     validate_base_url(" https://api.example.test/v1 ").as_deref(),
///     Some("https://api.example.test/v1")
/// );
/// assert_eq!(validate_base_url("api.example.test"), None);
/// assert_eq!(validate_base_url(""), None);
/// ```
pub fn validate_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Some(trimmed.to_string())
        }
        Ok(url) => {
            warn!(value = trimmed, scheme = url.scheme(), "Unsupported upstream URL, ignoring");
            None
        }
        Err(err) => {
            warn!(value = trimmed, error = %err, "Invalid upstream URL, ignoring");
            None
        }
    }
}

/// Returns true if `name` is a valid cookie name (an RFC 6265 token).
fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"'
                        | b'/' | b'[' | b']' | b'?' | b'=' | b'{' | b'}'
                )
        })
}

// ============================================================================
// Public Configuration Getters
// ============================================================================

/// Returns the cached upstream base URL, if configured and valid.
///
/// Read from `API_BASE_URL` on first access.
pub fn get_upstream_base_url() -> Option<&'static str> {
    UPSTREAM_BASE_URL.as_deref()
}

fn compute_upstream_base_url<F>(env_var: &F) -> Option<String>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    env_var(env_vars::API_BASE_URL)
        .ok()
        .and_then(|value| validate_base_url(&value))
}

/// Returns the cached upstream login path.
///
/// Read from `UPSTREAM_LOGIN_PATH` on first access (default: `/auth/login`).
pub fn get_upstream_login_path() -> &'static str {
    &UPSTREAM_LOGIN_PATH
}

fn compute_upstream_login_path<F>(env_var: &F) -> String
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match env_var(env_vars::UPSTREAM_LOGIN_PATH) {
        Ok(value) if !value.trim().is_empty() => {
            let path = value.trim();
            if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{path}")
            }
        }
        _ => defaults::UPSTREAM_LOGIN_PATH.to_string(),
    }
}

/// Returns the cached proxy configuration.
///
/// Configuration is read from environment variables on first access:
/// - `PROXY_TIMEOUT_SECS`: Upstream response and idle-read timeout (default: 30)
/// - `PROXY_CONNECT_TIMEOUT_SECS`: Upstream connect timeout (default: 10)
/// - `MAX_LOGIN_BODY_KB`: Maximum login body size (default: 64)
/// - `PROXY_ALLOWED_PATH_PREFIXES`: Comma-separated target path prefixes
///   (default: empty, every path is forwarded)
///
/// # Example
///
/// ```
/// use sessiongate::config::get_proxy_config;
///
/// let config = get_proxy_config();
/// println!("Timeout: {:?}, connect: {:?}", config.timeout, config.connect_timeout);
/// ```
pub fn get_proxy_config() -> &'static ProxyConfig {
    &PROXY_CONFIG
}

fn compute_proxy_config<F>(env_var: &F) -> ProxyConfig
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let timeout_secs =
        parse_env_var_or_default(env_var, env_vars::PROXY_TIMEOUT_SECS, defaults::PROXY_TIMEOUT_SECS);
    let connect_timeout_secs = parse_env_var_or_default(
        env_var,
        env_vars::PROXY_CONNECT_TIMEOUT_SECS,
        defaults::PROXY_CONNECT_TIMEOUT_SECS,
    );
    let max_login_body_kb =
        parse_env_var_or_default(env_var, env_vars::MAX_LOGIN_BODY_KB, defaults::MAX_LOGIN_BODY_KB);

    let allowed_path_prefixes = env_var(env_vars::PROXY_ALLOWED_PATH_PREFIXES)
        .map(|s| {
            parse_comma_separated(&s)
                .into_iter()
                .map(|prefix| {
                    if prefix.starts_with('/') {
                        prefix
                    } else {
                        format!("/{prefix}")
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let config = ProxyConfig {
        timeout: Duration::from_secs(timeout_secs),
        connect_timeout: Duration::from_secs(connect_timeout_secs),
        max_login_body: ProxyConfig::kb_to_bytes(max_login_body_kb),
        allowed_path_prefixes,
    };

    // Validate configuration
    if !config.is_valid() {
        warn!("Invalid proxy configuration, using defaults");
        return ProxyConfig {
            allowed_path_prefixes: config.allowed_path_prefixes,
            ..ProxyConfig::default()
        };
    }

    config
}

/// Returns the cached session cookie configuration.
///
/// Configuration is read from environment variables on first access:
/// - `SESSION_COOKIE_NAME`: Cookie name (default: `token`)
/// - `SESSION_COOKIE_SECURE`: `Secure` attribute (default: `true`)
pub fn get_session_cookie_config() -> &'static SessionCookieConfig {
    &SESSION_COOKIE_CONFIG
}

fn compute_session_cookie_config<F>(env_var: &F) -> SessionCookieConfig
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let name = match env_var(env_vars::SESSION_COOKIE_NAME) {
        Ok(value) if is_valid_cookie_name(value.trim()) => value.trim().to_string(),
        Ok(value) => {
            warn!(value = %value, "Invalid session cookie name, using default");
            defaults::SESSION_COOKIE_NAME.to_string()
        }
        Err(_) => defaults::SESSION_COOKIE_NAME.to_string(),
    };

    let secure = parse_bool_or_default(
        env_var,
        env_vars::SESSION_COOKIE_SECURE,
        defaults::SESSION_COOKIE_SECURE,
    );
    if !secure {
        warn!("Session cookie Secure attribute disabled; use only for local development");
    }

    SessionCookieConfig { name, secure }
}

/// Returns the cached maximum number of concurrent connections.
///
/// Limits simultaneous connections to prevent resource exhaustion.
/// When the limit is reached, new connections are closed immediately.
///
/// Configuration is read from `MAX_CONNECTIONS` environment variable on first access.
///
/// # Returns
///
/// - `0`: Unlimited connections
/// - `> 0`: Maximum number of concurrent connections
///
/// **Default**: `10000`
pub fn get_max_connections() -> usize {
    *MAX_CONNECTIONS
}

fn compute_max_connections<F>(env_var: &F) -> usize
where
    F: Fn(&str) -> Result<String, VarError>,
{
    parse_env_var_or_default(env_var, env_vars::MAX_CONNECTIONS, defaults::MAX_CONNECTIONS)
}

// ============================================================================
// EnvVarConfig - ConfigProvider implementation using environment variables
// ============================================================================

/// Configuration provider that reads from environment variables.
///
/// This is the default configuration provider for the SessionGate CLI.
/// Values come from the global lazy statics; only the upstream base URL can
/// be overridden, by the `--upstream` flag.
///
/// # Example
///
/// ```
/// use sessiongate::config::EnvVarConfig;
/// use sessiongate_core::UpstreamProvider;
///
/// let config = EnvVarConfig::new().with_upstream_override("http://127.0.0.1:9000");
/// assert_eq!(config.upstream_base_url(), Some("http://127.0.0.1:9000"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct EnvVarConfig {
    upstream_override: Option<String>,
}

impl EnvVarConfig {
    /// Creates a new configuration provider from environment variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `base_url` instead of `API_BASE_URL`. Invalid URLs are ignored
    /// with a warning.
    pub fn with_upstream_override(mut self, base_url: &str) -> Self {
        self.upstream_override = validate_base_url(base_url);
        self
    }
}

impl UpstreamProvider for EnvVarConfig {
    fn upstream_base_url(&self) -> Option<&str> {
        self.upstream_override
            .as_deref()
            .or(get_upstream_base_url())
    }

    fn upstream_login_path(&self) -> &str {
        get_upstream_login_path()
    }

    fn proxy_config(&self) -> &ProxyConfig {
        get_proxy_config()
    }
}

impl SessionProvider for EnvVarConfig {
    fn session_cookie_config(&self) -> &SessionCookieConfig {
        get_session_cookie_config()
    }
}

impl ConnectionProvider for EnvVarConfig {
    fn max_connections(&self) -> usize {
        get_max_connections()
    }
}
