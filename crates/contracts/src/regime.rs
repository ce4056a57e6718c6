//! Regime - operating points of an adaptive camera mission
//!
//! A regime couples a cruise speed with the camera configuration used while
//! flying at that speed. The table of regimes is immutable once built.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::ContractError;

/// Camera resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct Resolution {
    #[validate(range(min = 1, message = "width must be > 0"))]
    pub width: u32,

    #[validate(range(min = 1, message = "height must be > 0"))]
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel count of one frame
    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A named operating regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Regime {
    /// Regime label, also used as the capture filename prefix
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: String,

    /// Forward speed while capturing (m/s)
    pub speed: f64,

    /// Camera resolution applied before the first capture
    pub resolution: Resolution,

    /// Horizontal field of view (degrees)
    #[validate(range(exclusive_min = 0.0, message = "fov_degrees must be > 0"))]
    pub fov_degrees: f64,

    /// Images captured once the move finished
    #[serde(default = "default_capture_count")]
    pub capture_count: u32,

    /// Duration of the velocity command (seconds)
    #[serde(default = "default_move_duration")]
    #[validate(range(exclusive_min = 0.0, message = "move_duration_secs must be > 0"))]
    pub move_duration_secs: f64,
}

fn default_capture_count() -> u32 {
    3
}

fn default_move_duration() -> f64 {
    2.0
}

impl Regime {
    pub fn new(
        name: impl Into<String>,
        speed: f64,
        resolution: Resolution,
        fov_degrees: f64,
        capture_count: u32,
    ) -> Self {
        Self {
            name: name.into(),
            speed,
            resolution,
            fov_degrees,
            capture_count,
            move_duration_secs: default_move_duration(),
        }
    }

    /// Check that the vehicle can fly this regime
    ///
    /// # Errors
    /// `ContractError::InvalidRegime` listing every offending parameter.
    pub fn check(&self) -> Result<(), ContractError> {
        let mut problems = Vec::new();

        if let Err(errors) = Validate::validate(self) {
            problems.extend(describe(&errors));
        }
        if let Err(errors) = self.resolution.validate() {
            problems.extend(describe(&errors));
        }

        for (field, value) in [
            ("speed", self.speed),
            ("fov_degrees", self.fov_degrees),
            ("move_duration_secs", self.move_duration_secs),
        ] {
            if !value.is_finite() {
                problems.push(format!("{field} must be finite, got {value}"));
            }
        }

        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            problems.push("name may only contain [A-Za-z0-9_-]".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ContractError::invalid_regime(&self.name, problems.join("; ")))
        }
    }
}

fn describe(errors: &ValidationErrors) -> Vec<String> {
    let mut out: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    out.sort();
    out
}

/// Ordered, validated list of regimes
///
/// Regimes are flown in table order; nothing reorders or skips them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegimeTable {
    regimes: Vec<Regime>,
}

impl RegimeTable {
    /// Build a table, rejecting empty tables, invalid regimes and duplicate names
    pub fn new(regimes: Vec<Regime>) -> Result<Self, ContractError> {
        if regimes.is_empty() {
            return Err(ContractError::config_validation(
                "regimes",
                "at least one regime is required",
            ));
        }

        let mut seen = HashSet::new();
        for regime in &regimes {
            regime.check()?;
            if !seen.insert(regime.name.as_str()) {
                return Err(ContractError::invalid_regime(
                    &regime.name,
                    "duplicate regime name",
                ));
            }
        }

        Ok(Self { regimes })
    }

    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    pub fn len(&self) -> usize {
        self.regimes.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.regimes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Regime> {
        self.regimes.iter()
    }

    /// Number of capture attempts a full mission makes
    pub fn total_captures(&self) -> u64 {
        self.regimes.iter().map(|r| u64::from(r.capture_count)).sum()
    }
}

impl<'a> IntoIterator for &'a RegimeTable {
    type Item = &'a Regime;
    type IntoIter = std::slice::Iter<'a, Regime>;

    fn into_iter(self) -> Self::IntoIter {
        self.regimes.iter()
    }
}

/// The slow/fast pair flown when no regimes are configured
pub fn default_regimes() -> Vec<Regime> {
    vec![
        Regime::new("slow", 1.0, Resolution::new(640, 480), 70.0, 3),
        Regime::new("fast", 6.0, Resolution::new(320, 240), 110.0, 3),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = RegimeTable::new(default_regimes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.regimes()[0].name, "slow");
        assert_eq!(table.regimes()[1].name, "fast");
        assert_eq!(table.total_captures(), 6);
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = RegimeTable::new(vec![]).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut regime = default_regimes().remove(0);
        regime.resolution.width = 0;
        let err = regime.check().unwrap_err();
        assert!(matches!(err, ContractError::InvalidRegime { .. }));
        assert!(err.to_string().contains("width must be > 0"), "got: {err}");
    }

    #[test]
    fn test_non_positive_fov_rejected() {
        let mut regime = default_regimes().remove(0);
        regime.fov_degrees = 0.0;
        let err = regime.check().unwrap_err();
        assert!(err.to_string().contains("fov_degrees must be > 0"), "got: {err}");

        regime.fov_degrees = -10.0;
        assert!(regime.check().is_err());
    }

    #[test]
    fn test_nan_fov_rejected() {
        let mut regime = default_regimes().remove(0);
        regime.fov_degrees = f64::NAN;
        let err = regime.check().unwrap_err();
        assert!(err.to_string().contains("finite"), "got: {err}");
    }

    #[test]
    fn test_zero_capture_count_allowed() {
        let mut regime = default_regimes().remove(0);
        regime.capture_count = 0;
        assert!(regime.check().is_ok());
    }

    #[test]
    fn test_path_like_name_rejected() {
        let mut regime = default_regimes().remove(0);
        regime.name = "../slow".into();
        assert!(regime.check().is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut regimes = default_regimes();
        regimes[1].name = "slow".into();
        let err = RegimeTable::new(regimes).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "got: {err}");
    }

    #[test]
    fn test_table_preserves_order() {
        let regimes = vec![
            Regime::new("c", 1.0, Resolution::new(10, 10), 60.0, 1),
            Regime::new("a", 2.0, Resolution::new(10, 10), 60.0, 1),
            Regime::new("b", 3.0, Resolution::new(10, 10), 60.0, 1),
        ];
        let table = RegimeTable::new(regimes).unwrap();
        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
