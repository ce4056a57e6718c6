//! # Vehicle Client
//!
//! Remote session with a simulated multirotor.
//!
//! Responsibilities:
//! - Define the `VehicleClient` command surface (control, arming, motion, camera, capture)
//! - Talk msgpack-rpc to a real AirSim server
//! - Provide an in-memory mock with fault injection for tests and dry runs
//!
//! ## Feature Flags
//!
//! - `real-airsim`: Enable the AirSim msgpack-rpc client (default)

pub mod client;
pub mod error;
pub mod mock_client;

#[cfg(feature = "real-airsim")]
pub mod airsim_client;
#[cfg(feature = "real-airsim")]
mod rpc;

pub use client::VehicleClient;
pub use error::{Result, VehicleError};
pub use mock_client::{FaultPoint, MockCall, MockConfig, MockOp, MockVehicleClient};

#[cfg(feature = "real-airsim")]
pub use airsim_client::AirSimClient;
