//! Configuration parsing
//!
//! TOML (primary) and JSON (optional).

use contracts::{ContractError, MissionBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML document
pub fn parse_toml(content: &str) -> Result<MissionBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON document
pub fn parse_json(content: &str) -> Result<MissionBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to `format`
pub fn parse(content: &str, format: ConfigFormat) -> Result<MissionBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_regimes() {
        let content = r#"
[connection]
host = "10.0.0.5"

[[regimes]]
name = "slow"
speed = 1.0
resolution = { width = 640, height = 480 }
fov_degrees = 70.0
capture_count = 3

[[regimes]]
name = "fast"
speed = 6.0
resolution = { width = 320, height = 240 }
fov_degrees = 110.0
capture_count = 2
move_duration_secs = 1.5
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.connection.host, "10.0.0.5");
        assert_eq!(bp.connection.port, 41451);
        assert_eq!(bp.regimes.len(), 2);
        assert_eq!(bp.regimes[0].move_duration_secs, 2.0);
        assert_eq!(bp.regimes[1].move_duration_secs, 1.5);
        assert_eq!(bp.regimes[1].capture_count, 2);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "vehicle": { "name": "Drone2" },
            "regimes": [{
                "name": "hover",
                "speed": 0.0,
                "resolution": { "width": 256, "height": 144 },
                "fov_degrees": 90.0
            }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.vehicle.name, "Drone2");
        assert_eq!(bp.vehicle.camera, "0");
        assert_eq!(bp.regimes[0].capture_count, 3);
    }

    #[test]
    fn test_negative_capture_count_is_parse_error() {
        let content = r#"
[[regimes]]
name = "slow"
speed = 1.0
resolution = { width = 640, height = 480 }
fov_degrees = 70.0
capture_count = -1
"#;
        let err = parse_toml(content).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
