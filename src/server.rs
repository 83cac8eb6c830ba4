//! Server startup output and the accept loop.

use std::env;
use std::future::Future;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::connection::{ConnectionLimiter, ConnectionTracker};
use crate::{args::Args, env_vars};
use sessiongate_core::defaults::SHUTDOWN_GRACE;
use sessiongate_core::request_handler::handle_request;
use sessiongate_core::{
    ConfigProvider, ConnectionProvider, SessionProvider, UpstreamClient, UpstreamProvider,
};

/// Print startup banner with configuration
pub fn print_startup_info<C: ConfigProvider>(args: &Args, config: &C) {
    if args.quiet {
        // Quiet mode: only essential information
        println!(
            "🚀 SessionGate v{} starting on port {}",
            env!("CARGO_PKG_VERSION"),
            args.listen
        );
        return;
    }

    // Normal/verbose mode: full configuration display
    println!("🔐 {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("   {}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("📡 Network Configuration:");
    println!("   Bind Address:   {}", args.bind);
    println!("   Listen Port:    {}", args.listen);
    match config.max_connections() {
        0 => println!("   Connections:    unlimited"),
        max => println!("   Connections:    {max} max"),
    }
    println!();

    println!("🎯 Upstream:");
    match config.upstream_base_url() {
        Some(url) => println!("   Base URL:       {url}"),
        None => println!("   Base URL:       [NOT SET] (every request will fail with 500)"),
    }
    println!("   Login Path:     {}", config.upstream_login_path());

    let proxy_config = config.proxy_config();
    println!("🔧 Proxy Configuration:");
    println!("   Timeout:        {} seconds", proxy_config.timeout.as_secs());
    println!(
        "   Connect:        {} seconds",
        proxy_config.connect_timeout.as_secs()
    );
    println!("   Max Login Body: {} KB", proxy_config.max_login_body / 1024);

    print_security_config(config);

    // Show environment configuration in verbose mode
    if args.verbose {
        print_env_config();
    }

    println!();
    println!("🚀 Server starting...");
}

/// Print security configuration summary
fn print_security_config<C: ConfigProvider>(config: &C) {
    let session = config.session_cookie_config();
    let prefixes = &config.proxy_config().allowed_path_prefixes;

    println!("🔒 Security Configuration:");
    println!(
        "   Session Cookie: {} (HttpOnly, SameSite=Lax{})",
        session.name,
        if session.secure { ", Secure" } else { "" }
    );

    if prefixes.is_empty() {
        println!("   Proxy Paths:    All (upstream must be network-isolated)");
    } else {
        println!("   Proxy Paths:    {}", prefixes.join(", "));
    }
}

/// Print environment variable configuration status (used in verbose mode)
fn print_env_config() {
    println!();
    println!("🔧 Environment Variables:");

    for &var_name in env_vars::all_env_vars() {
        match env::var(var_name) {
            Ok(value) => println!("   {var_name:<28} = {value}"),
            Err(_) => println!("   {var_name:<28} = [NOT SET]"),
        }
    }
}

/// Binds the listener described by `args`.
pub async fn bind(args: &Args) -> std::io::Result<TcpListener> {
    let bind_ip: std::net::IpAddr = args.bind.parse().map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid bind address")
    })?;
    TcpListener::bind((bind_ip, args.listen)).await
}

/// Accepts connections until `shutdown` resolves, then drains.
///
/// Over-limit connections are closed as soon as they are accepted. After
/// `shutdown`, open connections finish their in-flight request and are
/// given [`SHUTDOWN_GRACE`] before the function returns.
pub async fn serve<C, S>(
    listener: TcpListener,
    config: Arc<C>,
    client: UpstreamClient,
    shutdown: S,
) -> std::io::Result<()>
where
    C: ConfigProvider + 'static,
    S: Future<Output = ()>,
{
    let limiter = ConnectionLimiter::new(config.max_connections());
    let tracker = ConnectionTracker::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(());

    info!(addr = %listener.local_addr()?, "SessionGate listening");

    tokio::pin!(shutdown);
    loop {
        let (stream, addr) = tokio::select! {
            () = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(error = %err, "Failed to accept connection");
                    continue;
                }
            },
        };

        let admission = limiter.try_admit();
        if admission.is_rejected() {
            warn!(
                client = %addr,
                max = limiter.max_connections(),
                "Connection limit reached, closing connection"
            );
            continue;
        }

        debug!(client = %addr, "New connection");

        let guard = tracker.track();
        let config = config.clone();
        let client = client.clone();
        let mut shutdown_rx = shutdown_rx.clone();

        tokio::spawn(async move {
            let _admission = admission;
            let _guard = guard;

            let service =
                service_fn(move |req| handle_request(req, config.clone(), client.clone()));
            let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
            tokio::pin!(conn);

            let result = tokio::select! {
                result = conn.as_mut() => result,
                _ = shutdown_rx.changed() => {
                    conn.as_mut().graceful_shutdown();
                    conn.await
                }
            };

            if let Err(err) = result {
                debug!(client = %addr, error = %err, "Connection error");
            }
        });
    }

    drop(listener);
    info!(active = tracker.count(), "Shutting down, draining connections");
    let _ = shutdown_tx.send(());

    if tracker.wait_for_shutdown(SHUTDOWN_GRACE).await {
        info!("All connections closed");
    } else {
        warn!(
            remaining = tracker.count(),
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "Grace period elapsed, abandoning connections"
        );
    }

    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
