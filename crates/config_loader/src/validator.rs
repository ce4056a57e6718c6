//! Configuration validation
//!
//! Rules:
//! - connection host non-empty, port != 0
//! - vehicle and camera names non-empty
//! - altitude finite, cruise_speed > 0
//! - regime table valid (non-empty, unique names, flyable parameters)

use contracts::{ContractError, MissionBlueprint};

/// Validate a MissionBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    validate_connection(blueprint)?;
    validate_vehicle(blueprint)?;
    validate_flight(blueprint)?;
    validate_regimes(blueprint)?;
    Ok(())
}

fn validate_connection(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    let connection = &blueprint.connection;
    if connection.host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "connection.host",
            "host cannot be empty",
        ));
    }
    if connection.port == 0 {
        return Err(ContractError::config_validation(
            "connection.port",
            "port must be > 0",
        ));
    }
    Ok(())
}

fn validate_vehicle(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    if blueprint.vehicle.name.is_empty() {
        return Err(ContractError::config_validation(
            "vehicle.name",
            "vehicle name cannot be empty",
        ));
    }
    if blueprint.vehicle.camera.is_empty() {
        return Err(ContractError::config_validation(
            "vehicle.camera",
            "camera name cannot be empty",
        ));
    }
    Ok(())
}

fn validate_flight(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    let flight = &blueprint.flight;
    if !flight.altitude.is_finite() {
        return Err(ContractError::config_validation(
            "flight.altitude",
            format!("altitude must be finite, got {}", flight.altitude),
        ));
    }
    if !(flight.cruise_speed.is_finite() && flight.cruise_speed > 0.0) {
        return Err(ContractError::config_validation(
            "flight.cruise_speed",
            format!("cruise_speed must be > 0, got {}", flight.cruise_speed),
        ));
    }
    Ok(())
}

fn validate_regimes(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    blueprint.regime_table().map(|_| ())
}
