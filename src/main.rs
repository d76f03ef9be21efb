//! Vaultage - a simple Vault CLI.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vaultage::cli::output;
use vaultage::cli::{execute, Cli};
use vaultage::core::constants::LOG_ENV;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.globals.verbose {
            EnvFilter::new("vaultage=debug")
        } else {
            EnvFilter::new("vaultage=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = output::suggestion(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
