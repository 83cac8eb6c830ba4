//! SessionGate - Session cookies in front, streaming proxy behind
//!
//! A thin edge gateway between a browser and an upstream API.
//!
//! # Overview
//!
//! SessionGate is written in Rust and provides:
//! - Credential exchange turning an upstream token into an HttpOnly cookie
//! - Idempotent logout
//! - A streaming GET proxy with header sanitization
//! - Connection limiting and graceful shutdown
//! - Structured logging with JSON support
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sessiongate::{config::EnvVarConfig, server};
//! use sessiongate_core::{UpstreamClient, UpstreamProvider};
//!
//! # async fn run() -> std::io::Result<()> {
//! let config = Arc::new(EnvVarConfig::new().with_upstream_override("https://api.example.test"));
//! let client = UpstreamClient::new(config.proxy_config()).expect("client");
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! server::serve(listener, config, client, server::shutdown_signal()).await
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration management from environment variables
//! - [`env_vars`] - Environment variable constants
//! - [`server`] - Startup info and the accept loop
//! - [`connection`] - Connection limiting and tracking
//! - [`args`] - Command line argument parsing
//!
//! # Re-exports from sessiongate-core
//!
//! Request handling is provided by the `sessiongate-core` crate:
//! - [`request_handler`] - Routing of inbound requests
//! - [`handlers`] - Login, logout and proxy handlers
//! - [`types`] - Configuration traits and wire payloads

#![forbid(unsafe_code)]

pub mod args;
pub mod config;
pub mod connection;
pub mod env_vars;
pub mod server;

// Re-export sessiongate-core modules
pub use sessiongate_core::handlers;
pub use sessiongate_core::request_handler;
pub use sessiongate_core::types;

// Re-export commonly used items at crate root
pub use config::{
    EnvVarConfig, get_max_connections, get_proxy_config, get_session_cookie_config,
    get_upstream_base_url, get_upstream_login_path,
};
pub use sessiongate_core::{
    // Aggregated configuration trait
    ConfigProvider,
    // Composable configuration traits
    ConnectionProvider,
    // Configuration structs
    ProxyConfig,
    SessionCookieConfig,
    SessionProvider,
    UpstreamProvider,
    // Upstream client
    UpstreamClient,
};
