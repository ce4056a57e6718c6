//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// AirSim Pilot - regime-adaptive flight and image capture for AirSim
#[derive(Parser, Debug)]
#[command(
    name = "airsim-pilot",
    author,
    version,
    about = "Regime-adaptive flight and image capture for AirSim multirotors",
    long_about = "Drives an AirSim multirotor through a table of regimes, reconfiguring \n\
                  the camera for each one and saving the captured frames, or flies it \n\
                  interactively from the keyboard."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "AIRSIM_PILOT_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "AIRSIM_PILOT_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "AIRSIM_PILOT_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fly a mission
    Run(RunArgs),

    /// Validate configuration file without flying
    Validate(ValidateArgs),
}

/// Flight mode
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightMode {
    /// Fly the regime table and capture images
    AdaptiveCam,
    /// Keyboard teleoperation on stdin
    Manual,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Flight mode
    #[arg(long, value_enum)]
    pub mode: FlightMode,

    /// Path to configuration file (TOML or JSON); built-in defaults when absent
    #[arg(short, long, env = "AIRSIM_PILOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override simulator host from configuration
    #[arg(long, env = "AIRSIM_HOST")]
    pub host: Option<String>,

    /// Override simulator RPC port from configuration
    #[arg(long, env = "AIRSIM_PORT")]
    pub port: Option<u16>,

    /// Override capture output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fly against the in-memory mock vehicle instead of a simulator
    #[arg(long)]
    pub mock: bool,

    /// Log captures instead of writing PNG files
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate; built-in defaults when absent
    #[arg(short, long, env = "AIRSIM_PILOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_adaptive() {
        let cli = Cli::try_parse_from([
            "airsim-pilot",
            "run",
            "--mode",
            "adaptive-cam",
            "--mock",
            "--output",
            "/tmp/out",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.mode, FlightMode::AdaptiveCam);
                assert!(args.mock);
                assert_eq!(args.output, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        let err = Cli::try_parse_from(["airsim-pilot", "run", "--mode", "stable"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_mode_is_required() {
        assert!(Cli::try_parse_from(["airsim-pilot", "run"]).is_err());
    }
}
