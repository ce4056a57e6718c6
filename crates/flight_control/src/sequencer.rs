//! Adaptive camera mission
//!
//! Flies each regime of a [`RegimeTable`] in order: reconfigure the camera,
//! fly the regime's velocity command, then capture. Failures after control
//! was taken abort the remaining regimes; the vehicle is still landed,
//! disarmed and released.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use contracts::{
    CameraSettings, CaptureRecord, CaptureSink, ContractError, MotionCommand, Regime, RegimeTable,
    YawMode,
};
use observability::LatencySummary;
use tracing::{error, info, instrument, warn};
use vehicle_client::VehicleClient;

use crate::command::Commander;
use crate::error::{FlightError, Result, Stage};
use crate::lease::CleanupReport;
use crate::plan::FlightPlan;
use crate::shutdown::Shutdown;
use crate::staging;

/// What happened within one regime
#[derive(Debug)]
pub struct RegimeOutcome {
    pub regime: String,
    /// Indices of stored captures
    pub saved: Vec<u32>,
    /// `FlightError::CaptureMiss` per skipped capture
    pub misses: Vec<FlightError>,
    /// Move finished and every capture was attempted
    pub completed: bool,
}

impl RegimeOutcome {
    fn new(regime: &Regime) -> Self {
        Self {
            regime: regime.name.clone(),
            saved: Vec::new(),
            misses: Vec::new(),
            completed: false,
        }
    }

    pub fn saved(&self) -> usize {
        self.saved.len()
    }

    pub fn missed(&self) -> usize {
        self.misses.len()
    }
}

/// Mission summary
#[derive(Debug)]
pub struct MissionReport {
    /// Regimes that were started, in flight order
    pub regimes: Vec<RegimeOutcome>,
    /// Failure that ended the mission early
    pub abort: Option<FlightError>,
    pub cleanup: CleanupReport,
    pub latency: LatencySummary,
    pub duration: Duration,
}

impl MissionReport {
    pub fn regimes_completed(&self) -> usize {
        self.regimes.iter().filter(|r| r.completed).count()
    }

    pub fn saved(&self) -> usize {
        self.regimes.iter().map(RegimeOutcome::saved).sum()
    }

    pub fn missed(&self) -> usize {
        self.regimes.iter().map(RegimeOutcome::missed).sum()
    }

    /// No abort and a clean cleanup
    pub fn is_success(&self) -> bool {
        self.abort.is_none() && self.cleanup.is_clean()
    }
}

impl fmt::Display for MissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Mission Summary ===")?;
        writeln!(
            f,
            "Regimes completed: {}/{}",
            self.regimes_completed(),
            self.regimes.len()
        )?;
        for regime in &self.regimes {
            writeln!(
                f,
                "  {}: {} saved, {} missed{}",
                regime.regime,
                regime.saved(),
                regime.missed(),
                if regime.completed { "" } else { " (incomplete)" }
            )?;
        }
        writeln!(f, "Captures: {} saved, {} missed", self.saved(), self.missed())?;
        if let Some(abort) = &self.abort {
            writeln!(f, "Aborted: {abort}")?;
        }
        writeln!(
            f,
            "Cleanup: landed={} disarmed={} released={}",
            self.cleanup.landed, self.cleanup.disarmed, self.cleanup.control_released
        )?;
        write!(f, "{}", self.latency)?;
        writeln!(f, "Duration: {:.2}s", self.duration.as_secs_f64())
    }
}

/// Regime-adaptive flight driver
///
/// Borrows the client and sink exclusively for the duration of the run.
pub struct Sequencer<'a, C, S> {
    client: &'a mut C,
    sink: &'a mut S,
    plan: FlightPlan,
    shutdown: Shutdown<'a>,
}

impl<'a, C, S> Sequencer<'a, C, S>
where
    C: VehicleClient,
    S: CaptureSink,
{
    pub fn new(client: &'a mut C, sink: &'a mut S, plan: FlightPlan) -> Self {
        Self {
            client,
            sink,
            plan,
            shutdown: Shutdown::never(),
        }
    }

    /// Stop between stages once `signal` resolves; cleanup still runs
    pub fn with_shutdown(mut self, signal: impl Future<Output = ()> + Send + 'a) -> Self {
        self.shutdown = Shutdown::new(signal);
        self
    }

    /// Fly the whole table
    ///
    /// # Errors
    /// `Configuration` for an empty or invalid table and `Connection` when the
    /// simulator could not be reached or control could not be taken. Both
    /// happen before the vehicle moves. Later failures are in the report.
    #[instrument(
        name = "sequencer_run",
        skip_all,
        fields(vehicle = %self.plan.vehicle, regimes = table.len())
    )]
    pub async fn run(mut self, table: &RegimeTable) -> Result<MissionReport> {
        check_table(table)?;
        let started = Instant::now();
        let mut commander = Commander::new(self.plan.command_timeout);

        let lease = staging::take_control(&mut *self.client, &self.plan, &mut commander).await?;

        let mut regimes = Vec::with_capacity(table.len());
        let abort = match self.fly(table, &mut commander, &mut regimes).await {
            Ok(()) => None,
            Err(err) => {
                let stage = err.stage().map_or("unknown", |s| s.as_str());
                error!(stage, error = %err, "mission aborted, remaining regimes skipped");
                observability::record_mission_abort(stage);
                Some(err)
            }
        };

        let cleanup = lease.release(&*self.client, &mut commander).await;

        if let Err(e) = self.sink.flush().await {
            warn!(sink = self.sink.name(), error = %e, "sink flush failed");
        }

        let report = MissionReport {
            regimes,
            abort,
            cleanup,
            latency: commander.latency(),
            duration: started.elapsed(),
        };
        info!(
            completed = report.regimes_completed(),
            saved = report.saved(),
            missed = report.missed(),
            "mission finished"
        );
        Ok(report)
    }

    async fn fly(
        &mut self,
        table: &RegimeTable,
        commander: &mut Commander,
        regimes: &mut Vec<RegimeOutcome>,
    ) -> Result<()> {
        self.checkpoint(Stage::Arm).await?;
        staging::launch(&*self.client, &self.plan, commander).await?;

        for regime in table {
            let mut outcome = RegimeOutcome::new(regime);
            let result = self.fly_regime(regime, commander, &mut outcome).await;
            regimes.push(outcome);
            result?;
        }

        self.checkpoint(Stage::Hover).await?;
        commander
            .issue(Stage::Hover, self.client.hover(&self.plan.vehicle))
            .await
    }

    #[instrument(name = "regime", skip_all, fields(regime = %regime.name))]
    async fn fly_regime(
        &mut self,
        regime: &Regime,
        commander: &mut Commander,
        outcome: &mut RegimeOutcome,
    ) -> Result<()> {
        self.checkpoint(Stage::Reconfigure).await?;
        let vehicle = self.plan.vehicle.as_str();
        let camera = self.plan.camera.as_str();

        let settings = CameraSettings {
            resolution: regime.resolution,
            fov_degrees: regime.fov_degrees,
        };
        commander
            .issue(
                Stage::Reconfigure,
                self.client.set_camera(camera, settings, vehicle),
            )
            .await?;
        info!(
            resolution = %regime.resolution,
            fov = regime.fov_degrees,
            "camera reconfigured"
        );

        let command = MotionCommand::world(
            regime.speed,
            0.0,
            0.0,
            YawMode::angle(0.0),
            regime.move_duration_secs,
        );
        self.checkpoint(Stage::Move).await?;
        commander
            .issue(
                Stage::Move,
                self.client.move_by_velocity(command, &self.plan.vehicle),
            )
            .await?;

        for index in 0..regime.capture_count {
            self.checkpoint(Stage::Capture).await?;
            match self.capture(regime, index, commander).await {
                Ok(()) => outcome.saved.push(index),
                Err(miss) => {
                    warn!(index, error = %miss, "capture skipped");
                    observability::record_capture_missed(&regime.name);
                    outcome.misses.push(miss);
                }
            }
        }

        outcome.completed = true;
        info!(saved = outcome.saved(), missed = outcome.missed(), "regime done");
        Ok(())
    }

    async fn checkpoint(&mut self, stage: Stage) -> Result<()> {
        if self.shutdown.requested().await {
            warn!(%stage, "shutdown requested, stopping before next command");
            return Err(FlightError::Interrupted { stage });
        }
        Ok(())
    }

    /// One capture
    ///
    /// # Errors
    /// `CaptureMiss` when the session returned no image or the sink refused it.
    async fn capture(
        &mut self,
        regime: &Regime,
        index: u32,
        commander: &mut Commander,
    ) -> Result<()> {
        let call = self
            .client
            .capture_image(&self.plan.camera, &self.plan.vehicle);
        let image = match commander.issue(Stage::Capture, call).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                return Err(FlightError::capture_miss(&regime.name, index, "no image returned"))
            }
            Err(e) => return Err(FlightError::capture_miss(&regime.name, index, e)),
        };

        let record = CaptureRecord::new(&regime.name, index, image);
        self.sink
            .write(&record)
            .await
            .map_err(|e| FlightError::capture_miss(&regime.name, index, e))?;
        observability::record_capture_saved(&record);
        Ok(())
    }
}

fn check_table(table: &RegimeTable) -> Result<()> {
    if table.is_empty() {
        return Err(ContractError::config_validation(
            "regimes",
            "at least one regime is required",
        )
        .into());
    }
    for regime in table {
        regime.check()?;
    }
    Ok(())
}
