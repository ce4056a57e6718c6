//! MissionBlueprint - Config Loader output
//!
//! Describes the complete mission setup: simulator endpoint, vehicle, flight
//! defaults, capture output and the regime table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{default_regimes, ContractError, Regime, RegimeTable};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete mission blueprint
///
/// Every section has defaults, so an empty document describes the stock
/// slow/fast adaptive camera mission against a local simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Simulator endpoint
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Vehicle and camera identifiers
    #[serde(default)]
    pub vehicle: VehicleConfig,

    /// Flight defaults
    #[serde(default)]
    pub flight: FlightConfig,

    /// Capture output
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Ordered regimes
    #[serde(default = "default_regimes")]
    pub regimes: Vec<Regime>,
}

impl Default for MissionBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            connection: ConnectionConfig::default(),
            vehicle: VehicleConfig::default(),
            flight: FlightConfig::default(),
            capture: CaptureConfig::default(),
            regimes: default_regimes(),
        }
    }
}

impl MissionBlueprint {
    /// Build the validated regime table
    pub fn regime_table(&self) -> Result<RegimeTable, ContractError> {
        RegimeTable::new(self.regimes.clone())
    }
}

/// Simulator RPC endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    41451
}

/// Vehicle identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Vehicle name as known to the simulator
    #[serde(default = "default_vehicle_name")]
    pub name: String,

    /// Camera used for captures
    #[serde(default = "default_camera_name")]
    pub camera: String,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            name: default_vehicle_name(),
            camera: default_camera_name(),
        }
    }
}

fn default_vehicle_name() -> String {
    "Drone1".to_string()
}

fn default_camera_name() -> String {
    "0".to_string()
}

/// Flight defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    /// Target altitude after takeoff (NED frame: negative z is up)
    #[serde(default = "default_altitude")]
    pub altitude: f64,

    /// Speed used to climb to `altitude` (m/s)
    #[serde(default = "default_cruise_speed")]
    pub cruise_speed: f64,

    /// Upper bound on any single awaited command, 0 disables
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl FlightConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            altitude: default_altitude(),
            cruise_speed: default_cruise_speed(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

fn default_altitude() -> f64 {
    -5.0
}

fn default_cruise_speed() -> f64 {
    3.0
}

fn default_command_timeout() -> u64 {
    60
}

/// Capture output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Directory the PNG files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/adaptive_camera")
}
