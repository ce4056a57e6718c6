//! Flight control error types

use std::fmt;
use std::time::Duration;

use contracts::ContractError;
use thiserror::Error;
use vehicle_client::VehicleError;

/// Step of a flight, used to label failures, logs and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Connect,
    Ping,
    EnableControl,
    Arm,
    Takeoff,
    Ascend,
    Reconfigure,
    Move,
    Capture,
    Hover,
    Teleop,
    Land,
    Disarm,
    ReleaseControl,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Ping => "ping",
            Self::EnableControl => "enable_control",
            Self::Arm => "arm",
            Self::Takeoff => "takeoff",
            Self::Ascend => "ascend",
            Self::Reconfigure => "reconfigure",
            Self::Move => "move",
            Self::Capture => "capture",
            Self::Hover => "hover",
            Self::Teleop => "teleop",
            Self::Land => "land",
            Self::Disarm => "disarm",
            Self::ReleaseControl => "release_control",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flight control error
///
/// Only `Connection` and `Configuration` are returned from a run; the other
/// kinds end up inside the run's report.
#[derive(Debug, Error)]
pub enum FlightError {
    /// Simulator unreachable, or control could not be taken
    #[error("connection failed during {stage}: {source}")]
    Connection {
        stage: Stage,
        #[source]
        source: VehicleError,
    },

    /// Regime table rejected before any session call
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ContractError),

    /// An awaited command failed
    #[error("{stage} failed: {source}")]
    CommandFailure {
        stage: Stage,
        #[source]
        source: VehicleError,
    },

    /// An awaited command did not resolve in time
    #[error("{stage} timed out after {waited:?}")]
    Timeout { stage: Stage, waited: Duration },

    /// One capture produced no stored image
    #[error("capture {regime}#{index} missed: {reason}")]
    CaptureMiss {
        regime: String,
        index: u32,
        reason: String,
    },

    /// Unrecognised interactive token
    #[error("unknown command '{token}'")]
    UnknownInput { token: String },

    /// Shutdown requested; noticed before `stage` was issued
    #[error("interrupted before {stage}")]
    Interrupted { stage: Stage },
}

impl FlightError {
    pub fn capture_miss(regime: impl Into<String>, index: u32, reason: impl fmt::Display) -> Self {
        Self::CaptureMiss {
            regime: regime.into(),
            index,
            reason: reason.to_string(),
        }
    }

    /// Stage the error is attributed to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Connection { stage, .. }
            | Self::CommandFailure { stage, .. }
            | Self::Timeout { stage, .. }
            | Self::Interrupted { stage } => Some(*stage),
            Self::CaptureMiss { .. } => Some(Stage::Capture),
            Self::Configuration(_) | Self::UnknownInput { .. } => None,
        }
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Configuration(_) => "configuration",
            Self::CommandFailure { .. } => "command_failure",
            Self::Timeout { .. } => "timeout",
            Self::CaptureMiss { .. } => "capture_miss",
            Self::UnknownInput { .. } => "unknown_input",
            Self::Interrupted { .. } => "interrupted",
        }
    }

    /// Reclassify a failure of the connect/control phase as `Connection`
    pub(crate) fn into_connection(self) -> Self {
        match self {
            Self::CommandFailure { stage, source } => Self::Connection { stage, source },
            Self::Timeout { stage, waited } => Self::Connection {
                stage,
                source: VehicleError::connection(format!("no response within {waited:?}")),
            },
            other => other,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, FlightError>;
