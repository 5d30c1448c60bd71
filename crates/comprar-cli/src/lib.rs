//! Comprar CLI: scenario runner for the storefront suite.
//!
//! ## Usage
//!
//! ```bash
//! comprar scenarios                 # List built-in scenarios
//! comprar smoke --base-url <URL>   # Checkout + cancel smoke run (browser)
//! comprar clean --base-url <URL>   # Drain cart and pending orders
//! ```
//!
//! The `smoke` and `clean` commands drive a real browser and require the
//! `browser` feature; without it they fail with a clear message.

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

pub mod scenarios;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced by the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Failure inside the automation library
    #[error(transparent)]
    Comprar(#[from] comprar::ComprarError),

    /// I/O error (users file, runtime setup)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else worth stopping for
    #[error("{0}")]
    Generic(String),
}

/// Storefront scenario runner
#[derive(Debug, Parser)]
#[command(name = "comprar", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List built-in scenarios
    Scenarios,
    /// Run the checkout-and-cancel smoke scenario against a live storefront
    Smoke(RunArgs),
    /// Drain the cart and pending orders to a known-clean state
    Clean(RunArgs),
}

/// Arguments shared by browser-driving commands
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Base URL of the storefront under test
    #[arg(long, env = "COMPRAR_BASE_URL", default_value = "http://127.0.0.1:5000")]
    pub base_url: String,

    /// Run with a visible browser window
    #[arg(long)]
    pub headed: bool,

    /// Path to the chromium binary
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<String>,

    /// JSON file with test accounts (defaults to built-in accounts)
    #[arg(long)]
    pub users: Option<std::path::PathBuf>,

    /// Shipping address used by the checkout prompt
    #[arg(long)]
    pub shipping_address: Option<String>,
}

impl RunArgs {
    /// Load accounts from `--users` or fall back to the defaults
    pub fn load_users(&self) -> CliResult<comprar::fixture::TestUsers> {
        match &self.users {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                Ok(comprar::fixture::TestUsers::from_json(&json)?)
            }
            None => Ok(comprar::fixture::TestUsers::default()),
        }
    }
}

/// Initialize tracing from the verbosity flags (RUST_LOG still wins)
pub fn init_tracing(cli: &Cli) {
    let default = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_smoke_args_defaults() {
        let cli = Cli::parse_from(["comprar", "smoke"]);
        match cli.command {
            Commands::Smoke(args) => {
                assert_eq!(args.base_url, "http://127.0.0.1:5000");
                assert!(!args.headed);
                assert!(args.users.is_none());
            }
            other => panic!("expected smoke, got {other:?}"),
        }
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::parse_from(["comprar", "-vv", "scenarios"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_default_users_when_no_file() {
        let cli = Cli::parse_from(["comprar", "clean"]);
        let Commands::Clean(args) = cli.command else {
            panic!("expected clean");
        };
        let users = args.load_users().unwrap();
        assert!(users.shopper.email.contains('@'));
    }
}
