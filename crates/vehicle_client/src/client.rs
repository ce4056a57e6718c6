//! Vehicle client abstraction
//!
//! Defines traits for driving a simulated multirotor, supporting the real
//! AirSim implementation and mock testing.

use std::future::Future;

use contracts::{CameraSettings, MotionCommand, RawImage};

use crate::error::Result;

/// Vehicle client trait
///
/// Every operation resolves only once the simulator reports it finished, so
/// awaiting the returned future is the "join" on the remote command. Callers
/// keep at most one operation in flight per vehicle.
pub trait VehicleClient: Send + Sync {
    /// Connect to the simulator RPC endpoint
    fn connect(&mut self, host: &str, port: u16) -> impl Future<Output = Result<()>> + Send;

    /// Confirm the session is alive
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Grant or revoke API control of `vehicle`
    fn enable_api_control(
        &self,
        enabled: bool,
        vehicle: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Arm (`true`) or disarm (`false`) the motors
    fn arm_disarm(&self, arm: bool, vehicle: &str) -> impl Future<Output = Result<()>> + Send;

    /// Take off and hold a low hover
    fn takeoff(&self, vehicle: &str) -> impl Future<Output = Result<()>> + Send;

    /// Climb or descend to `z` (NED, negative is up) at `speed` m/s
    fn move_to_z(
        &self,
        z: f64,
        speed: f64,
        vehicle: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fly a velocity command for its full duration
    fn move_by_velocity(
        &self,
        command: MotionCommand,
        vehicle: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Apply resolution and field of view to `camera`
    ///
    /// Resolves once the simulator acknowledged both settings.
    fn set_camera(
        &self,
        camera: &str,
        settings: CameraSettings,
        vehicle: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Request one uncompressed scene image
    ///
    /// # Returns
    /// `None` when the simulator answered without an image.
    fn capture_image(
        &self,
        camera: &str,
        vehicle: &str,
    ) -> impl Future<Output = Result<Option<RawImage>>> + Send;

    /// Stop and hold position
    fn hover(&self, vehicle: &str) -> impl Future<Output = Result<()>> + Send;

    /// Land at the current position
    fn land(&self, vehicle: &str) -> impl Future<Output = Result<()>> + Send;
}
