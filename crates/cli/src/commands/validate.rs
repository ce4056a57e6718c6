//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::MissionBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    endpoint: String,
    vehicle: String,
    camera: String,
    regimes: Vec<String>,
    total_captures: u64,
    output_dir: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = match &args.config {
        Some(path) => path.display().to_string(),
        None => "<built-in defaults>".to_string(),
    };
    info!(config = %config_path, "Validating configuration");

    // Check file exists
    if let Some(path) = &args.config {
        if !path.exists() {
            return ValidationResult {
                valid: false,
                config_path,
                error: Some(format!("File not found: {}", path.display())),
                warnings: None,
                summary: None,
            };
        }
    }

    // Try to load and validate
    let loaded = config_loader::ConfigLoader::load_or_default(args.config.as_deref())
        .and_then(|blueprint| blueprint.regime_table().map(|table| (blueprint, table)));
    match loaded {
        Ok((blueprint, table)) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    endpoint: format!(
                        "{}:{}",
                        blueprint.connection.host, blueprint.connection.port
                    ),
                    vehicle: blueprint.vehicle.name.clone(),
                    camera: blueprint.vehicle.camera.clone(),
                    regimes: table
                        .iter()
                        .map(|r| {
                            format!(
                                "{} ({} m/s, {}, {}°, {} captures)",
                                r.name, r.speed, r.resolution, r.fov_degrees, r.capture_count
                            )
                        })
                        .collect(),
                    total_captures: table.total_captures(),
                    output_dir: blueprint.capture.output_dir.display().to_string(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &MissionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.flight.altitude >= 0.0 {
        warnings.push(format!(
            "flight.altitude is {} - NED z must be negative to fly above the start point",
            blueprint.flight.altitude
        ));
    }

    if blueprint.flight.command_timeout().is_none() {
        warnings.push("flight.command_timeout_secs is 0 - a stalled command blocks forever".to_string());
    }

    for regime in &blueprint.regimes {
        if regime.capture_count == 0 {
            warnings.push(format!("Regime '{}' captures no images", regime.name));
        }
        if regime.speed < 0.0 {
            warnings.push(format!("Regime '{}' flies backwards", regime.name));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Simulator: {}", summary.endpoint);
            println!("  Vehicle: {} (camera {})", summary.vehicle, summary.camera);
            println!("  Regimes:");
            for regime in &summary.regimes {
                println!("    - {}", regime);
            }
            println!("  Total captures: {}", summary.total_captures);
            println!("  Output: {}", summary.output_dir);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(content: &str) -> (tempfile::NamedTempFile, ValidateArgs) {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: Some(file.path().to_path_buf()),
            json: true,
        };
        (file, args)
    }

    #[test]
    fn test_defaults_are_valid() {
        let result = validate_config(&ValidateArgs {
            config: None,
            json: false,
        });
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.total_captures, 6);
        assert_eq!(summary.regimes.len(), 2);
    }

    #[test]
    fn test_invalid_regime_is_reported() {
        let (_file, args) = args_for(
            r#"
[[regimes]]
name = "wide"
speed = 2.0
resolution = { width = 0, height = 240 }
fov_degrees = 90.0
"#,
        );
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("wide"));
    }

    #[test]
    fn test_warnings() {
        let (_file, args) = args_for(
            r#"
[flight]
command_timeout_secs = 0

[[regimes]]
name = "idle"
speed = 0.0
resolution = { width = 320, height = 240 }
fov_degrees = 90.0
capture_count = 0
"#,
        );
        let result = validate_config(&args);
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert_eq!(warnings.len(), 2, "got: {warnings:?}");
    }
}
