//! # Flight Control
//!
//! Drives a `VehicleClient` through a mission.
//!
//! Responsibilities:
//! - Regime-adaptive capture mission (`Sequencer`)
//! - Interactive keyboard flight (`Teleop`)
//! - Bounded command waits and failure classification
//! - Unconditional land/disarm/release once control was taken (`ControlLease`)
//! - Operator shutdown honoured between commands (`Shutdown`)

mod command;
pub mod error;
pub mod keymap;
pub mod lease;
pub mod plan;
pub mod sequencer;
pub mod shutdown;
mod staging;
pub mod teleop;

pub use error::{FlightError, Result, Stage};
pub use keymap::{TeleopKey, Token};
pub use lease::{CleanupReport, ControlLease};
pub use plan::FlightPlan;
pub use sequencer::{MissionReport, RegimeOutcome, Sequencer};
pub use shutdown::Shutdown;
pub use teleop::{Teleop, TeleopReport, Termination};
