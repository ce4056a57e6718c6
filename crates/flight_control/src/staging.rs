//! Pre-flight staging shared by the sequencer and the teleop loop

use tracing::info;
use vehicle_client::VehicleClient;

use crate::command::Commander;
use crate::error::{FlightError, Result, Stage};
use crate::lease::ControlLease;
use crate::plan::FlightPlan;

/// Connect, confirm the session and take API control
///
/// Any failure here is `FlightError::Connection` and leaves nothing to clean up.
pub(crate) async fn take_control<C: VehicleClient>(
    client: &mut C,
    plan: &FlightPlan,
    commander: &mut Commander,
) -> Result<ControlLease> {
    info!(host = %plan.host, port = plan.port, "connecting to simulator");
    commander
        .issue(Stage::Connect, client.connect(&plan.host, plan.port))
        .await
        .map_err(FlightError::into_connection)?;
    commander
        .issue(Stage::Ping, client.ping())
        .await
        .map_err(FlightError::into_connection)?;

    ControlLease::acquire(client, &plan.vehicle, commander).await
}

/// Arm, take off and climb to the plan altitude
pub(crate) async fn launch<C: VehicleClient>(
    client: &C,
    plan: &FlightPlan,
    commander: &mut Commander,
) -> Result<()> {
    let vehicle = plan.vehicle.as_str();
    commander
        .issue(Stage::Arm, client.arm_disarm(true, vehicle))
        .await?;
    commander
        .issue(Stage::Takeoff, client.takeoff(vehicle))
        .await?;
    commander
        .issue(
            Stage::Ascend,
            client.move_to_z(plan.altitude, plan.cruise_speed, vehicle),
        )
        .await?;
    info!(altitude = plan.altitude, "airborne");
    Ok(())
}
