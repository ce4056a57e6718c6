//! # AirSim Pilot CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - Regime-adaptive capture missions and keyboard teleoperation
//! - Logging and metrics setup

mod cli;
mod commands;
mod error;

use anyhow::{Context, Result};
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_flight, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(execute(&cli));

    // A teleop session ended by a signal leaves a blocking stdin read behind
    runtime.shutdown_background();
    result
}

async fn execute(cli: &Cli) -> Result<()> {
    // Initialize logging and metrics based on CLI options
    observability::init_with_config(observability_config(cli))?;

    info!(version = env!("CARGO_PKG_VERSION"), "AirSim Pilot starting");

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_flight(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

fn observability_config(cli: &Cli) -> ObservabilityConfig {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: default_log_level.to_string(),
    }
}
