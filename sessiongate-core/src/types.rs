//! Type definitions for SessionGate configuration and wire payloads.
//!
//! Configuration reaches the handlers through small composable provider
//! traits, aggregated by [`ConfigProvider`], so the core never reads the
//! environment itself.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults;
use crate::error::{GatewayError, Result};
use crate::proxy_request::join_url;

// ============================================================================
// Composable Configuration Traits
// ============================================================================

/// Configuration for reaching the upstream service.
pub trait UpstreamProvider: Send + Sync {
    /// Returns the upstream base URL, or `None` when unconfigured.
    ///
    /// An unconfigured base is reported per request, not at startup.
    fn upstream_base_url(&self) -> Option<&str>;

    /// Returns the upstream path receiving login credentials.
    fn upstream_login_path(&self) -> &str {
        defaults::UPSTREAM_LOGIN_PATH
    }

    /// Returns the proxy configuration.
    fn proxy_config(&self) -> &ProxyConfig;
}

/// Configuration for the edge-owned session cookie.
pub trait SessionProvider: Send + Sync {
    /// Returns the session cookie configuration.
    fn session_cookie_config(&self) -> &SessionCookieConfig;
}

/// Configuration for connection limits.
pub trait ConnectionProvider: Send + Sync {
    /// Returns the maximum number of concurrent connections (0 = unlimited).
    fn max_connections(&self) -> usize;
}

/// Trait for complete configuration injection.
///
/// Implement the individual traits; any type implementing all of them is a
/// `ConfigProvider`.
///
/// # Example
///
/// ```
/// use sessiongate_core::{
///     ConnectionProvider, ProxyConfig, SessionCookieConfig, SessionProvider, UpstreamProvider,
/// };
/// use std::time::Duration;
///
/// struct MyConfig {
///     session: SessionCookieConfig,
/// }
///
/// impl UpstreamProvider for MyConfig {
///     fn upstream_base_url(&self) -> Option<&str> {
///         Some("https://api.example.test")
///     }
///
///     fn proxy_config(&self) -> &ProxyConfig {
///         static CONFIG: ProxyConfig = ProxyConfig {
///             timeout: Duration::from_secs(30),
///             connect_timeout: Duration::from_secs(10),
///             max_login_body: 64 * 1024,
///             allowed_path_prefixes: Vec::new(),
///         };
///         &CONFIG
///     }
/// }
///
/// impl SessionProvider for MyConfig {
///     fn session_cookie_config(&self) -> &SessionCookieConfig {
///         &self.session
///     }
/// }
///
/// impl ConnectionProvider for MyConfig {
///     fn max_connections(&self) -> usize { 10_000 }
/// }
/// ```
pub trait ConfigProvider: UpstreamProvider + SessionProvider + ConnectionProvider {
    /// Returns the upstream base URL or the configuration error every
    /// handler reports before touching the network.
    fn require_upstream_base(&self) -> Result<&str> {
        self.upstream_base_url()
            .filter(|base| !base.trim().is_empty())
            .ok_or_else(|| {
                GatewayError::ConfigError("Upstream API base URL is not configured".to_string())
            })
    }
}

// Blanket implementation: any type implementing all sub-traits is a ConfigProvider
impl<T> ConfigProvider for T where T: UpstreamProvider + SessionProvider + ConnectionProvider {}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Configuration for upstream calls and proxy policy.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Limit on waiting for response headers and on each idle gap in the body.
    pub timeout: Duration,
    /// Timeout for establishing the upstream connection.
    pub connect_timeout: Duration,
    /// Maximum accepted login request body, in bytes.
    pub max_login_body: usize,
    /// Target path prefixes the proxy may forward to. Empty allows every
    /// path and leaves the boundary to network isolation of the upstream.
    pub allowed_path_prefixes: Vec<String>,
}

impl ProxyConfig {
    /// Check if the configuration is valid
    pub fn is_valid(&self) -> bool {
        !self.timeout.is_zero() && !self.connect_timeout.is_zero() && self.max_login_body > 0
    }

    /// Returns true if the proxy may forward `target_path` below `base`.
    ///
    /// The check runs on the path the upstream will actually receive, after
    /// URL parsing has resolved dot segments and backslashes. A prefix only
    /// matches on a segment boundary.
    ///
    /// # Example
    ///
    /// ```
    /// use sessiongate_core::ProxyConfig;
    ///
    /// let base = "https://api.example.test";
    /// let mut config = ProxyConfig::default();
    /// assert!(config.is_path_allowed(base, "/anything"));
    ///
    /// config.allowed_path_prefixes = vec!["/orders".into()];
    /// assert!(config.is_path_allowed(base, "/orders/42"));
    /// assert!(!config.is_path_allowed(base, "/orders-internal"));
    /// assert!(!config.is_path_allowed(base, "/admin"));
    /// ```
    pub fn is_path_allowed(&self, base: &str, target_path: &str) -> bool {
        if self.allowed_path_prefixes.is_empty() {
            return true;
        }

        let Ok(resolved) = Url::parse(&join_url(base, target_path)) else {
            return false;
        };
        let base_path = Url::parse(base)
            .map(|url| url.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        let Some(path) = resolved.path().strip_prefix(base_path.as_str()) else {
            return false;
        };

        self.allowed_path_prefixes
            .iter()
            .any(|prefix| has_path_prefix(path, prefix))
    }

    /// Convert KB to bytes for internal use
    pub fn kb_to_bytes(kb: usize) -> usize {
        kb * 1024
    }
}

/// Segment-aware prefix match: `/orders` covers `/orders` and `/orders/1`
/// but not `/orders-internal`.
fn has_path_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.is_empty() || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout: defaults::PROXY_TIMEOUT,
            connect_timeout: defaults::PROXY_CONNECT_TIMEOUT,
            max_login_body: defaults::MAX_LOGIN_BODY,
            allowed_path_prefixes: Vec::new(),
        }
    }
}

/// Attributes of the session cookie.
///
/// `HttpOnly`, `SameSite=Lax` and `Path=/` are fixed; only the name and
/// the `Secure` flag are configurable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCookieConfig {
    /// Cookie name.
    pub name: String,
    /// Whether the cookie is restricted to secure transport.
    pub secure: bool,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            name: defaults::SESSION_COOKIE_NAME.to_string(),
            secure: defaults::SESSION_COOKIE_SECURE,
        }
    }
}

// ============================================================================
// Wire payloads
// ============================================================================

/// Credentials posted to the login route and relayed upstream.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful upstream login response.
///
/// Every field is optional: a token-less success is tolerated.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamLoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
    pub message: Option<String>,
}

impl UpstreamLoginResponse {
    /// Returns the session token if the upstream issued a non-empty one.
    pub fn session_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// JSON body of every gateway-authored response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}
