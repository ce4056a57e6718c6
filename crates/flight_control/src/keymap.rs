//! Teleop key table

use contracts::{MotionCommand, YawMode};

/// Duration of one movement key press (seconds)
pub const MOVE_DURATION_SECS: f64 = 0.5;
/// Duration of the stop command (seconds)
pub const STOP_DURATION_SECS: f64 = 0.1;
/// Yaw rate of the turn keys (deg/s)
pub const YAW_RATE_DEG_S: f64 = 30.0;

/// Movement keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeleopKey {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    YawLeft,
    YawRight,
}

/// `(key, token, [vx, vy, vz, yaw_rate])`
static KEY_TABLE: [(TeleopKey, &str, [f64; 4]); 8] = [
    (TeleopKey::Forward, "w", [1.0, 0.0, 0.0, 0.0]),
    (TeleopKey::Back, "s", [-1.0, 0.0, 0.0, 0.0]),
    (TeleopKey::Left, "a", [0.0, -1.0, 0.0, 0.0]),
    (TeleopKey::Right, "d", [0.0, 1.0, 0.0, 0.0]),
    (TeleopKey::Up, "q", [0.0, 0.0, -1.0, 0.0]),
    (TeleopKey::Down, "e", [0.0, 0.0, 1.0, 0.0]),
    (TeleopKey::YawLeft, "j", [0.0, 0.0, 0.0, -YAW_RATE_DEG_S]),
    (TeleopKey::YawRight, "l", [0.0, 0.0, 0.0, YAW_RATE_DEG_S]),
];

impl TeleopKey {
    fn entry(&self) -> &'static (TeleopKey, &'static str, [f64; 4]) {
        // KEY_TABLE holds every variant exactly once, in declaration order
        &KEY_TABLE[*self as usize]
    }

    fn from_token(token: &str) -> Option<Self> {
        KEY_TABLE
            .iter()
            .find(|(_, t, _)| *t == token)
            .map(|(key, _, _)| *key)
    }

    /// Key as typed
    pub fn token(&self) -> &'static str {
        self.entry().1
    }

    /// `[vx, vy, vz, yaw_rate]`
    pub fn vector(&self) -> [f64; 4] {
        self.entry().2
    }

    /// World-frame, yaw-rate velocity command for one key press
    pub fn command(&self) -> MotionCommand {
        let [vx, vy, vz, yaw_rate] = self.vector();
        MotionCommand::world(vx, vy, vz, YawMode::rate(yaw_rate), MOVE_DURATION_SECS)
    }
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Move(TeleopKey),
    Stop,
    Exit,
    Blank,
    Unknown(String),
}

impl Token {
    /// Parse a raw line: surrounding whitespace and case are ignored
    pub fn parse(line: &str) -> Self {
        let token = line.trim().to_lowercase();
        match token.as_str() {
            "" => Self::Blank,
            "x" => Self::Stop,
            "exit" => Self::Exit,
            other => match TeleopKey::from_token(other) {
                Some(key) => Self::Move(key),
                None => Self::Unknown(token),
            },
        }
    }

    /// Command to dispatch, if the token moves the vehicle
    pub fn command(&self) -> Option<MotionCommand> {
        match self {
            Self::Move(key) => Some(key.command()),
            Self::Stop => Some(MotionCommand::stop(STOP_DURATION_SECS)),
            Self::Exit | Self::Blank | Self::Unknown(_) => None,
        }
    }

    /// Label for logs and metrics
    pub fn label(&self) -> &str {
        match self {
            Self::Move(key) => key.token(),
            Self::Stop => "x",
            Self::Exit => "exit",
            Self::Blank => "",
            Self::Unknown(token) => token,
        }
    }
}

pub const HELP: &str = "\
Controls:
  w/s  forward/back     a/d  left/right
  q/e  up/down          j/l  yaw left/right
  x    stop             exit quit and land
";
