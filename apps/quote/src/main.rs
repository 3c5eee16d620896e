//! bazaar-quote - price a checkout request from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Price a request, print the breakdown as JSON
//! bazaar-quote quote --input request.json --pretty
//!
//! # Build the order-creation payload
//! bazaar-quote submit --input request.json
//!
//! # Show the effective configuration
//! bazaar-quote --config ./checkout.toml policy
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the default filter); stdout only
//! ever carries the requested document.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod input;

use config::QuoteConfig;
use error::AppResult;
use input::CheckoutRequest;

#[derive(Parser)]
#[command(name = "bazaar-quote")]
#[command(author, version, about = "Bazaar checkout pricing")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a checkout request
    Quote {
        /// Checkout request JSON (`-` for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Build the order submission payload
    Submit {
        /// Checkout request JSON (`-` for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective configuration as TOML
    Policy,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bazaar_core=trace` - Trace the pricing crate only
/// - Default: INFO, DEBUG for bazaar crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bazaar_core=debug,bazaar_quote=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> AppResult<()> {
    let config = QuoteConfig::load(cli.config)?;

    match cli.command {
        Commands::Quote { input, pretty } => {
            let session = CheckoutRequest::read(&input)?
                .into_session(config.to_policy()?, config.cart.normalization)?;
            let breakdown = session.quote().rounded();

            info!(
                subtotal = %config.format_currency(breakdown.subtotal),
                discounts = %config.format_currency(breakdown.total_discount()),
                total = %config.format_currency(breakdown.total),
                "Quote ready"
            );
            print_json(&breakdown, pretty)?;
        }
        Commands::Submit { input, pretty } => {
            let session = CheckoutRequest::read(&input)?
                .into_session(config.to_policy()?, config.cart.normalization)?;
            let submission = session.submit()?;

            info!(
                id = %submission.id,
                total = %config.format_currency(submission.breakdown.total),
                "Submission ready"
            );
            print_json(&submission, pretty)?;
        }
        Commands::Policy => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> AppResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| error::AppError::Output(e.to_string()))?;

    println!("{json}");
    Ok(())
}
