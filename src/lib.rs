//! Conformance harness for the Verifiable Credentials data model.
//!
//! Drives external implementation generators (subprocess, REST, or
//! token-emitting subprocess) against input fixtures, and aggregates each
//! implementation's raw test-run report into a single cross-implementation
//! conformance matrix rendered as HTML tables.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod config;
pub mod document;
pub mod generator;
pub mod jwt;
pub mod report;

/// Parse the CLI and dispatch. The binary's whole entrypoint after dotenv.
pub async fn run() -> Result<()> {
    init_tracing();

    let args = cli::Cli::parse();
    match args.command {
        cli::Command::Report(args) => cli::run_report(args).await,
        cli::Command::Generate(args) => cli::run_generate(args).await,
        cli::Command::Check(args) => cli::run_check(args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (tests call run() repeatedly) is not an error worth
    // surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
