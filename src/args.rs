//! Command line argument parsing for SessionGate.
//!
//! This module defines the CLI interface using [`clap`] for argument parsing.
//! It provides configuration for the bind address, the listen port, the
//! upstream override and output verbosity.
//!
//! # Example
//!
//! ```no_run
//! use sessiongate::args::Args;
//! use clap::Parser;
//!
//! let args = Args::parse();
//! if let Err(e) = args.validate() {
//!     eprintln!("Configuration error: {}", e);
//!     std::process::exit(1);
//! }
//! ```

use clap::Parser;

use crate::config::validate_base_url;

/// Command line arguments for SessionGate.
///
/// Everything else is configured through environment variables, see
/// [`crate::env_vars`].
#[derive(Debug, Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(
    long_about = "🔐 Session cookies in front, streaming proxy behind\nExchanges credentials for an HttpOnly session cookie and forwards GET calls to an upstream API\n\nExample usage:\n  sessiongate --listen 3000 --upstream https://api.example.com\n  API_BASE_URL=https://api.example.com sessiongate -l 3000 --verbose"
)]
#[command(
    after_help = "Environment variables:\n  API_BASE_URL                 Upstream API base URL (required per request)\n  UPSTREAM_LOGIN_PATH          Upstream login path (default: /auth/login)\n  PROXY_TIMEOUT_SECS           Upstream exchange timeout (default: 30)\n  PROXY_CONNECT_TIMEOUT_SECS   Upstream connect timeout (default: 10)\n  PROXY_ALLOWED_PATH_PREFIXES  Comma-separated proxy path allow-list (default: all)\n  MAX_LOGIN_BODY_KB            Maximum login body size (default: 64)\n  SESSION_COOKIE_NAME          Session cookie name (default: token)\n  SESSION_COOKIE_SECURE        Secure cookie attribute (default: true)\n  MAX_CONNECTIONS              Concurrent connection limit, 0 = unlimited (default: 10000)"
)]
pub struct Args {
    /// Address to bind to
    #[arg(
        long,
        short = 'b',
        help = "Bind address for incoming connections",
        value_name = "ADDRESS",
        default_value = "0.0.0.0"
    )]
    pub bind: String,

    /// Port to listen on for incoming requests
    #[arg(
        long,
        short = 'l',
        help = "Listen port for incoming connections",
        value_name = "PORT",
        default_value_t = 3000
    )]
    pub listen: u16,

    /// Upstream API base URL, overriding `API_BASE_URL`
    #[arg(
        long,
        short = 'u',
        help = "Upstream API base URL (overrides API_BASE_URL)",
        value_name = "URL"
    )]
    pub upstream: Option<String>,

    /// Enable verbose output
    #[arg(
        long,
        short = 'v',
        help = "Show detailed configuration and startup information"
    )]
    pub verbose: bool,

    /// Enable quiet mode (minimal output)
    #[arg(
        long,
        short = 'q',
        help = "Suppress configuration output, show only essential messages",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output logs in JSON format (for structured logging)
    #[arg(long, help = "Output logs in JSON format for structured logging")]
    pub json_logs: bool,
}

impl Args {
    /// Validates the parsed command line arguments.
    ///
    /// Performs the following validations:
    /// - Listen port must be greater than 0
    /// - Bind address must be a valid IP address
    /// - `--upstream`, when given, must be an absolute http(s) URL
    ///
    /// # Example
    ///
    /// ```
    /// use sessiongate::args::Args;
    /// use clap::Parser;
    ///
    /// let args = Args::try_parse_from(["sessiongate", "-l", "3000", "-u", "localhost"]).unwrap();
    /// assert!(args.validate().is_err());
    ///
    /// let args = Args::try_parse_from(["sessiongate", "-l", "3000", "-u", "http://localhost:9000"]).unwrap();
    /// assert!(args.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if self.listen == 0 {
            return Err("Listen port must be greater than 0".to_string());
        }

        // Validate bind address format
        if self.bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address: '{}'", self.bind));
        }

        if let Some(upstream) = &self.upstream
            && validate_base_url(upstream).is_none()
        {
            return Err(format!(
                "Invalid upstream URL: '{upstream}' (expected http:// or https://)"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sessiongate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.bind, "0.0.0.0");
        assert_eq!(args.listen, 3000);
        assert!(args.upstream.is_none());
        assert!(!args.verbose && !args.quiet && !args.json_logs);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_invalid_bind() {
        let args = parse(&["--bind", "localhost"]);
        assert!(args.validate().unwrap_err().contains("bind address"));
    }

    #[test]
    fn test_zero_port() {
        let args = parse(&["--listen", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_upstream_validation() {
        assert!(parse(&["--upstream", "https://api.example.test"]).validate().is_ok());
        assert!(parse(&["--upstream", "ftp://api.example.test"]).validate().is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["sessiongate", "-v", "-q"]).is_err());
    }
}
