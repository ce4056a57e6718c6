//! Motion and camera commands issued to the vehicle

use serde::{Deserialize, Serialize};

use crate::Resolution;

/// Yaw behaviour during a velocity command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YawMode {
    /// `true`: `yaw_or_rate` is a rate (deg/s), `false`: an absolute angle (deg)
    pub is_rate: bool,
    pub yaw_or_rate: f64,
}

impl YawMode {
    /// Hold an absolute heading
    pub const fn angle(degrees: f64) -> Self {
        Self {
            is_rate: false,
            yaw_or_rate: degrees,
        }
    }

    /// Turn at a fixed rate
    pub const fn rate(degrees_per_sec: f64) -> Self {
        Self {
            is_rate: true,
            yaw_or_rate: degrees_per_sec,
        }
    }
}

impl Default for YawMode {
    fn default() -> Self {
        Self::rate(0.0)
    }
}

/// Frame the velocity components are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityFrame {
    /// North-east-down world frame
    #[default]
    World,
    /// Vehicle body frame
    Body,
}

/// A velocity command
///
/// Immutable once built; the session resolves the call when `duration_secs` elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub yaw: YawMode,
    pub duration_secs: f64,
    pub frame: VelocityFrame,
}

impl MotionCommand {
    /// World-frame velocity command
    pub const fn world(vx: f64, vy: f64, vz: f64, yaw: YawMode, duration_secs: f64) -> Self {
        Self {
            vx,
            vy,
            vz,
            yaw,
            duration_secs,
            frame: VelocityFrame::World,
        }
    }

    /// Zero body-frame velocity, used to brake
    pub const fn stop(duration_secs: f64) -> Self {
        Self {
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            yaw: YawMode::rate(0.0),
            duration_secs,
            frame: VelocityFrame::Body,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0 && self.vz == 0.0 && self.yaw.yaw_or_rate == 0.0
    }
}

/// Camera parameters applied together
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub resolution: Resolution,
    pub fov_degrees: f64,
}
