//! Per-run flight parameters

use std::time::Duration;

use contracts::MissionBlueprint;

/// Everything a driver needs besides the regime table
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    pub host: String,
    pub port: u16,
    pub vehicle: String,
    pub camera: String,
    /// Altitude reached after takeoff (NED, negative is up)
    pub altitude: f64,
    /// Climb speed to `altitude` (m/s)
    pub cruise_speed: f64,
    /// Bound on every awaited command (None = unbounded)
    pub command_timeout: Option<Duration>,
}

impl FlightPlan {
    pub fn from_blueprint(blueprint: &MissionBlueprint) -> Self {
        Self {
            host: blueprint.connection.host.clone(),
            port: blueprint.connection.port,
            vehicle: blueprint.vehicle.name.clone(),
            camera: blueprint.vehicle.camera.clone(),
            altitude: blueprint.flight.altitude,
            cruise_speed: blueprint.flight.cruise_speed,
            command_timeout: blueprint.flight.command_timeout(),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }
}

impl Default for FlightPlan {
    fn default() -> Self {
        Self::from_blueprint(&MissionBlueprint::default())
    }
}
