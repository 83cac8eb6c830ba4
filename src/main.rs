use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sessiongate::args::Args;
use sessiongate::config::EnvVarConfig;
use sessiongate::server;
use sessiongate_core::{UpstreamClient, UpstreamProvider};

/// Initializes the tracing subscriber: `RUST_LOG` filter (default `info`,
/// `debug` with `--verbose`, `warn` with `--quiet`), plain or JSON output.
fn init_logging(args: &Args) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if args.json_logs {
        registry.with(fmt::layer().json().with_target(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    if let Err(err) = result {
        eprintln!("⚠️  Failed to initialize logging: {err}");
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Configuration error: {err}");
        std::process::exit(1);
    }

    init_logging(&args);

    let mut config = EnvVarConfig::new();
    if let Some(upstream) = &args.upstream {
        config = config.with_upstream_override(upstream);
    }

    server::print_startup_info(&args, &config);

    let client = match UpstreamClient::new(config.proxy_config()) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("❌ Failed to create upstream client: {err}");
            std::process::exit(1);
        }
    };

    let listener = match server::bind(&args).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("❌ Failed to bind to {}:{}: {}", args.bind, args.listen, err);
            std::process::exit(1);
        }
    };

    println!("✅ SessionGate is running on port {}", args.listen);

    if let Err(err) = server::serve(
        listener,
        Arc::new(config),
        client,
        server::shutdown_signal(),
    )
    .await
    {
        eprintln!("❌ Server error: {err}");
        std::process::exit(1);
    }
}
