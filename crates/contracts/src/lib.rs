//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace: mission
//! blueprint, regimes, motion commands, capture records and the sink trait.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Frames
//! - Motion uses the simulator's NED frame: negative z is up
//! - Yaw angles and rates are in degrees

mod blueprint;
mod capture;
mod error;
mod motion;
mod regime;
mod sink;

pub use blueprint::*;
pub use capture::*;
pub use error::*;
pub use motion::*;
pub use regime::*;
pub use sink::*;
