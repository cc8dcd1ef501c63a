//! depdocs CLI entry point.
//!
//! Handles argument parsing, logging setup, command execution, and
//! user-friendly error display.

use anyhow::Result;
use clap::Parser;
use depdocs_cli::cli;
use depdocs_cli::core::user_friendly_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
