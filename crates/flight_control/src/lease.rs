//! Control lease
//!
//! Holding a [`ControlLease`] proves API control of the vehicle was granted.
//! The only way to end a lease cleanly is [`ControlLease::release`], which
//! lands, disarms and hands control back.

use tracing::{error, info, warn};
use vehicle_client::VehicleClient;

use crate::command::Commander;
use crate::error::{FlightError, Result, Stage};

/// Outcome of the cleanup sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub landed: bool,
    pub disarmed: bool,
    pub control_released: bool,
    /// Failed steps with their error message
    pub failures: Vec<(Stage, String)>,
}

impl CleanupReport {
    /// All three steps succeeded
    pub fn is_clean(&self) -> bool {
        self.landed && self.disarmed && self.control_released
    }
}

/// Proof that API control is enabled on `vehicle`
#[must_use = "an unreleased lease leaves the vehicle under API control"]
#[derive(Debug)]
pub struct ControlLease {
    vehicle: String,
    released: bool,
}

impl ControlLease {
    /// Enable API control and take the lease
    ///
    /// # Errors
    /// `FlightError::Connection` when control could not be enabled; no lease
    /// exists then and nothing needs cleaning up.
    pub(crate) async fn acquire<C: VehicleClient>(
        client: &C,
        vehicle: &str,
        commander: &mut Commander,
    ) -> Result<Self> {
        commander
            .issue(Stage::EnableControl, client.enable_api_control(true, vehicle))
            .await
            .map_err(FlightError::into_connection)?;

        info!(vehicle, "api control enabled");
        Ok(Self {
            vehicle: vehicle.to_string(),
            released: false,
        })
    }

    pub fn vehicle(&self) -> &str {
        &self.vehicle
    }

    /// Land, disarm and release control
    ///
    /// Every step is attempted even when an earlier one failed.
    pub(crate) async fn release<C: VehicleClient>(
        mut self,
        client: &C,
        commander: &mut Commander,
    ) -> CleanupReport {
        self.released = true;
        let vehicle = self.vehicle.as_str();
        let mut report = CleanupReport::default();

        match commander.issue(Stage::Land, client.land(vehicle)).await {
            Ok(()) => report.landed = true,
            Err(e) => report.failures.push((Stage::Land, e.to_string())),
        }
        match commander
            .issue(Stage::Disarm, client.arm_disarm(false, vehicle))
            .await
        {
            Ok(()) => report.disarmed = true,
            Err(e) => report.failures.push((Stage::Disarm, e.to_string())),
        }
        match commander
            .issue(
                Stage::ReleaseControl,
                client.enable_api_control(false, vehicle),
            )
            .await
        {
            Ok(()) => report.control_released = true,
            Err(e) => report.failures.push((Stage::ReleaseControl, e.to_string())),
        }

        if report.is_clean() {
            info!(vehicle, "vehicle landed, disarmed and released");
        } else {
            warn!(vehicle, failures = ?report.failures, "cleanup incomplete");
        }
        report
    }
}

impl Drop for ControlLease {
    fn drop(&mut self) {
        if !self.released {
            error!(
                vehicle = %self.vehicle,
                "control lease dropped without cleanup; vehicle may still be airborne"
            );
        }
    }
}
