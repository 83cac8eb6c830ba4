//! Test utilities for SessionGate.
//!
//! This module provides shared test configuration types and a minimal
//! in-process HTTP server used across unit tests.
//! It is only compiled when running tests (`#[cfg(test)]`).

use crate::types::{
    ConnectionProvider, ProxyConfig, SessionCookieConfig, SessionProvider, UpstreamProvider,
};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// Shared test configuration for unit tests.
///
/// Implements all configuration traits with sensible defaults and builder
/// methods for customization.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub upstream_base_url: Option<String>,
    pub upstream_login_path: String,
    pub proxy: ProxyConfig,
    pub session: SessionCookieConfig,
    pub max_connections: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            upstream_base_url: Some("https://api.example.test".to_string()),
            upstream_login_path: "/auth/login".to_string(),
            proxy: ProxyConfig {
                timeout: Duration::from_secs(5),
                connect_timeout: Duration::from_secs(1),
                max_login_body: 64 * 1024,
                allowed_path_prefixes: vec![],
            },
            session: SessionCookieConfig::default(),
            max_connections: 10_000,
        }
    }
}

impl TestConfig {
    /// Create a new test configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration without an upstream base URL.
    pub fn unconfigured() -> Self {
        Self {
            upstream_base_url: None,
            ..Self::default()
        }
    }

    /// Configure the upstream base URL.
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.upstream_base_url = Some(base_url.to_string());
        self
    }

    /// Configure the proxy path allow-list.
    pub fn with_allowed_prefixes(mut self, prefixes: Vec<&str>) -> Self {
        self.proxy.allowed_path_prefixes = prefixes.into_iter().map(String::from).collect();
        self
    }

    /// Configure the maximum login body size.
    pub fn with_max_login_body(mut self, bytes: usize) -> Self {
        self.proxy.max_login_body = bytes;
        self
    }

    /// Configure the session cookie name.
    pub fn with_cookie_name(mut self, name: &str) -> Self {
        self.session.name = name.to_string();
        self
    }
}

impl UpstreamProvider for TestConfig {
    fn upstream_base_url(&self) -> Option<&str> {
        self.upstream_base_url.as_deref()
    }

    fn upstream_login_path(&self) -> &str {
        &self.upstream_login_path
    }

    fn proxy_config(&self) -> &ProxyConfig {
        &self.proxy
    }
}

impl SessionProvider for TestConfig {
    fn session_cookie_config(&self) -> &SessionCookieConfig {
        &self.session
    }
}

impl ConnectionProvider for TestConfig {
    fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// Serves `handler` on an ephemeral localhost port until the runtime stops.
pub async fn spawn_server<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(Request<Incoming>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Response<Full<Bytes>>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let handler = handler.clone();
                    async move { Ok::<_, Infallible>(handler(req).await) }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TestConfig::new();
        assert_eq!(
            config.upstream_base_url.as_deref(),
            Some("https://api.example.test")
        );
        assert_eq!(config.session.name, "token");
        assert!(config.session.secure);
        assert!(config.proxy.allowed_path_prefixes.is_empty());
    }

    #[test]
    fn test_builder_methods() {
        let config = TestConfig::unconfigured()
            .with_upstream("http://127.0.0.1:9000")
            .with_allowed_prefixes(vec!["/orders"])
            .with_max_login_body(16)
            .with_cookie_name("sid");

        assert_eq!(config.upstream_base_url(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.proxy.allowed_path_prefixes, vec!["/orders"]);
        assert_eq!(config.proxy.max_login_body, 16);
        assert_eq!(config.session.name, "sid");
    }
}
