//! `run` command implementation.

use std::future::Future;

use anyhow::{Context, Result};
use capture_sink::{FileSink, LogSink};
use contracts::{CaptureSink, MissionBlueprint, RegimeTable};
use flight_control::{CleanupReport, FlightPlan, Sequencer, Teleop};
use tokio::io::BufReader;
use tracing::{error, info, warn};
use vehicle_client::{MockVehicleClient, VehicleClient};

use crate::cli::{FlightMode, RunArgs};
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_flight(args: &RunArgs) -> Result<()> {
    let blueprint = load_blueprint(args)?;
    let plan = FlightPlan::from_blueprint(&blueprint);

    info!(
        mode = ?args.mode,
        host = %plan.host,
        port = plan.port,
        vehicle = %plan.vehicle,
        regimes = blueprint.regimes.len(),
        "Configuration loaded"
    );

    fly_selected_client(args, &blueprint, plan).await?;

    info!("AirSim Pilot finished");
    Ok(())
}

/// Load configuration and apply command-line overrides
fn load_blueprint(args: &RunArgs) -> Result<MissionBlueprint> {
    if let Some(path) = &args.config {
        info!(config = %path.display(), "Loading configuration");
        if !path.exists() {
            return Err(CliError::config_not_found(path.display().to_string()).into());
        }
    } else {
        info!("No configuration file given, using built-in defaults");
    }

    let mut blueprint = config_loader::ConfigLoader::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding simulator host from CLI");
        blueprint.connection.host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port = %port, "Overriding simulator port from CLI");
        blueprint.connection.port = port;
    }
    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding output directory from CLI");
        blueprint.capture.output_dir = output.clone();
    }

    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after CLI overrides")?;
    Ok(blueprint)
}

#[cfg(feature = "real-airsim")]
async fn fly_selected_client(
    args: &RunArgs,
    blueprint: &MissionBlueprint,
    plan: FlightPlan,
) -> Result<()> {
    if args.mock {
        info!("Running against MOCK vehicle (no simulator required)");
        let mut client = MockVehicleClient::new();
        fly(&mut client, args, blueprint, plan, shutdown_signal()).await
    } else {
        let mut client = vehicle_client::AirSimClient::new();
        fly(&mut client, args, blueprint, plan, shutdown_signal()).await
    }
}

#[cfg(not(feature = "real-airsim"))]
async fn fly_selected_client(
    args: &RunArgs,
    blueprint: &MissionBlueprint,
    plan: FlightPlan,
) -> Result<()> {
    if !args.mock {
        warn!("Built without the `real-airsim` feature, falling back to the mock vehicle");
    }
    info!("Running against MOCK vehicle (no simulator required)");
    let mut client = MockVehicleClient::new();
    fly(&mut client, args, blueprint, plan, shutdown_signal()).await
}

/// Fly `args.mode` with `client`
///
/// Only failures to start (unreachable simulator, control refused, invalid
/// table) are errors. Aborts after takeoff are logged and the run still
/// succeeds once cleanup ran.
async fn fly<C: VehicleClient>(
    client: &mut C,
    args: &RunArgs,
    blueprint: &MissionBlueprint,
    plan: FlightPlan,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    match args.mode {
        FlightMode::AdaptiveCam => {
            let table = blueprint
                .regime_table()
                .context("Invalid regime table")?;
            if args.dry_run {
                info!("Dry run - captures are logged, not written");
                let mut sink = LogSink::new("log");
                adaptive(client, &mut sink, plan, &table, shutdown).await
            } else {
                let output_dir = &blueprint.capture.output_dir;
                let mut sink = FileSink::new("file", output_dir).with_context(|| {
                    format!("Failed to create output directory {}", output_dir.display())
                })?;
                info!(output = %output_dir.display(), "Writing captures");
                adaptive(client, &mut sink, plan, &table, shutdown).await
            }
        }
        FlightMode::Manual => manual(client, plan, shutdown).await,
    }
}

/// Fly the regime table
async fn adaptive<C, S>(
    client: &mut C,
    sink: &mut S,
    plan: FlightPlan,
    table: &RegimeTable,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()>
where
    C: VehicleClient,
    S: CaptureSink,
{
    let report = Sequencer::new(client, sink, plan)
        .with_shutdown(shutdown)
        .run(table)
        .await
        .context("Mission failed to start")?;

    if let Err(e) = sink.close().await {
        warn!(sink = sink.name(), error = %e, "Failed to close sink");
    }

    println!("\n{report}");

    if let Some(abort) = &report.abort {
        warn!(error = %abort, "Mission aborted, remaining regimes skipped");
    }
    log_cleanup(&report.cleanup);
    Ok(())
}

/// Keyboard teleoperation on stdin/stdout
async fn manual<C: VehicleClient>(
    client: &mut C,
    plan: FlightPlan,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    let report = Teleop::new(client, plan)
        .with_shutdown(shutdown)
        .run(input, output)
        .await
        .context("Teleop failed to start")?;

    info!(
        dispatched = report.dispatched,
        unknown = report.unknown,
        termination = ?report.termination,
        "Teleop session ended"
    );
    log_cleanup(&report.cleanup);
    Ok(())
}

fn log_cleanup(cleanup: &CleanupReport) {
    if cleanup.is_clean() {
        return;
    }
    for (stage, message) in &cleanup.failures {
        error!(%stage, error = %message, "Cleanup step failed, check the vehicle");
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal, landing after the current command");
}
