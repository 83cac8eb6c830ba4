//! SessionGate Core - Session-cookie gateway components
//!
//! This crate provides the core functionality of a thin edge gateway that
//! sits between a browser and an upstream API:
//! - Credential exchange turning an upstream token into an HttpOnly cookie
//! - Idempotent logout clearing that cookie
//! - Streaming GET proxy with header sanitization
//! - Client-side interceptor reacting to session expiry
//!
//! # Overview
//!
//! `sessiongate-core` is framework-agnostic at its seams: handlers take any
//! [`hyper::body::Body`], and configuration is provided via the
//! [`ConfigProvider`] trait, allowing flexible configuration from any source.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sessiongate_core::{
//!     ConnectionProvider, ProxyConfig, SessionCookieConfig, SessionProvider,
//!     UpstreamClient, UpstreamProvider,
//! };
//!
//! struct MyConfig {
//!     proxy: ProxyConfig,
//!     session: SessionCookieConfig,
//! }
//!
//! impl UpstreamProvider for MyConfig {
//!     fn upstream_base_url(&self) -> Option<&str> { Some("https://api.example.test") }
//!     fn proxy_config(&self) -> &ProxyConfig { &self.proxy }
//! }
//!
//! impl SessionProvider for MyConfig {
//!     fn session_cookie_config(&self) -> &SessionCookieConfig { &self.session }
//! }
//!
//! impl ConnectionProvider for MyConfig {
//!     fn max_connections(&self) -> usize { 10_000 }
//! }
//!
//! let config = Arc::new(MyConfig {
//!     proxy: ProxyConfig::default(),
//!     session: SessionCookieConfig::default(),
//! });
//! let client = UpstreamClient::new(config.proxy_config()).unwrap();
//! // Pass `config` and `client` to `request_handler::handle_request`.
//! ```
//!
//! # Modules
//!
//! - [`types`] - Configuration traits and wire payloads
//! - [`error`] - Error types and result aliases
//! - [`handlers`] - Login, logout and proxy handlers
//! - [`request_handler`] - Routing of inbound requests
//! - [`proxy_request`] - Proxy descriptor and URL resolution
//! - [`headers`] - Header constants and sanitization
//! - [`cookies`] - Session cookie construction
//! - [`upstream`] - Pooled upstream client
//! - [`interceptor`], [`navigator`], [`store`] - Client-side session expiry

#![forbid(unsafe_code)]

pub mod cookies;
pub mod defaults;
pub mod error;
pub mod handlers;
pub mod headers;
pub mod interceptor;
pub mod navigator;
pub mod proxy_request;
pub mod request_handler;
pub mod response;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod types;
pub mod upstream;

// Re-export commonly used items at crate root
pub use error::{GatewayError, NetworkError, Result, UpstreamError};
pub use interceptor::{AuthedClient, InterceptError, RequestInit};
pub use navigator::{
    BrowserNavigator, InjectedRouterNavigator, Location, MemoryLocation, Navigator, Router,
};
pub use proxy_request::ProxyRequest;
pub use response::GatewayBody;
pub use store::{KeyValueStore, MemoryStore, RedirectMemory, StoreEvent, take_redirect};
pub use types::{
    // Aggregated configuration trait
    ConfigProvider,
    // Composable configuration traits
    ConnectionProvider,
    // Configuration structs
    ProxyConfig,
    SessionCookieConfig,
    SessionProvider,
    UpstreamProvider,
    // Wire payloads
    LoginRequest,
    UpstreamLoginResponse,
};
pub use upstream::{UpstreamClient, UpstreamResponse};
