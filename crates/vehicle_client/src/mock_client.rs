//! Mock vehicle client
//!
//! In-memory vehicle for unit and end-to-end tests. Records every call in
//! order and supports failure, hang and empty-image injection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use contracts::{CameraSettings, ImageFormat, MotionCommand, RawImage, Resolution};
use tracing::instrument;

use crate::client::VehicleClient;
use crate::error::{Result, VehicleError};

/// Camera resolution before any `set_camera`
const DEFAULT_RESOLUTION: Resolution = Resolution::new(256, 144);

/// Operation kinds, used to address injected faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Connect,
    Ping,
    EnableApiControl,
    DisableApiControl,
    Arm,
    Disarm,
    Takeoff,
    MoveToZ,
    MoveByVelocity,
    SetCamera,
    CaptureImage,
    Hover,
    Land,
}

impl MockOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Ping => "ping",
            Self::EnableApiControl => "enable_api_control",
            Self::DisableApiControl => "disable_api_control",
            Self::Arm => "arm",
            Self::Disarm => "disarm",
            Self::Takeoff => "takeoff",
            Self::MoveToZ => "move_to_z",
            Self::MoveByVelocity => "move_by_velocity",
            Self::SetCamera => "set_camera",
            Self::CaptureImage => "capture_image",
            Self::Hover => "hover",
            Self::Land => "land",
        }
    }
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Connect { host: String, port: u16 },
    Ping,
    EnableApiControl(bool),
    ArmDisarm(bool),
    Takeoff,
    MoveToZ { z: f64, speed: f64 },
    MoveByVelocity(MotionCommand),
    SetCamera(CameraSettings),
    CaptureImage,
    Hover,
    Land,
}

impl MockCall {
    pub fn op(&self) -> MockOp {
        match self {
            Self::Connect { .. } => MockOp::Connect,
            Self::Ping => MockOp::Ping,
            Self::EnableApiControl(true) => MockOp::EnableApiControl,
            Self::EnableApiControl(false) => MockOp::DisableApiControl,
            Self::ArmDisarm(true) => MockOp::Arm,
            Self::ArmDisarm(false) => MockOp::Disarm,
            Self::Takeoff => MockOp::Takeoff,
            Self::MoveToZ { .. } => MockOp::MoveToZ,
            Self::MoveByVelocity(_) => MockOp::MoveByVelocity,
            Self::SetCamera(_) => MockOp::SetCamera,
            Self::CaptureImage => MockOp::CaptureImage,
            Self::Hover => MockOp::Hover,
            Self::Land => MockOp::Land,
        }
    }
}

/// The `nth` (0-based) occurrence of `op`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaultPoint {
    pub op: MockOp,
    pub nth: usize,
}

impl FaultPoint {
    pub fn first(op: MockOp) -> Self {
        Self { op, nth: 0 }
    }

    pub fn nth(op: MockOp, nth: usize) -> Self {
        Self { op, nth }
    }
}

/// Mock client configuration
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// Refuse `connect`
    pub refuse_connection: bool,
    /// Calls that return an error
    pub failures: Vec<FaultPoint>,
    /// Calls that never resolve
    pub hangs: Vec<FaultPoint>,
    /// Capture calls (0-based, counted across the session) answered without an image
    pub empty_captures: Vec<usize>,
}

/// Mock vehicle client
pub struct MockVehicleClient {
    config: MockConfig,
    calls: Mutex<Vec<MockCall>>,
    connected: AtomicBool,
    api_control: AtomicBool,
    armed: AtomicBool,
    camera: Mutex<CameraSettings>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockVehicleClient {
    /// Create a mock client that accepts everything
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock client with injected faults
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            calls: Mutex::new(Vec::new()),
            connected: AtomicBool::new(false),
            api_control: AtomicBool::new(false),
            armed: AtomicBool::new(false),
            camera: Mutex::new(CameraSettings {
                resolution: DEFAULT_RESOLUTION,
                fov_degrees: 90.0,
            }),
        }
    }

    /// All calls in issue order
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Operation kinds in issue order
    pub fn ops(&self) -> Vec<MockOp> {
        lock(&self.calls).iter().map(MockCall::op).collect()
    }

    /// Number of calls of `op`
    pub fn count(&self, op: MockOp) -> usize {
        lock(&self.calls).iter().filter(|c| c.op() == op).count()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn api_control_enabled(&self) -> bool {
        self.api_control.load(Ordering::SeqCst)
    }

    /// Record the call, then apply any fault scheduled for it
    async fn record(&self, call: MockCall) -> Result<()> {
        let op = call.op();
        let point = {
            let mut calls = lock(&self.calls);
            let nth = calls.iter().filter(|c| c.op() == op).count();
            calls.push(call);
            FaultPoint { op, nth }
        };

        if self.config.hangs.contains(&point) {
            std::future::pending::<()>().await;
        }
        if self.config.failures.contains(&point) {
            return Err(VehicleError::rejected(op.name(), "mock failure"));
        }
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(VehicleError::NotConnected)
        }
    }

    /// Motion requires API control and armed motors
    fn ensure_flyable(&self, op: MockOp) -> Result<()> {
        self.ensure_connected()?;
        if !self.api_control_enabled() {
            return Err(VehicleError::rejected(op.name(), "api control not enabled"));
        }
        if !self.is_armed() {
            return Err(VehicleError::rejected(op.name(), "vehicle not armed"));
        }
        Ok(())
    }

    fn synthesize_image(&self, seq: usize) -> RawImage {
        let resolution = lock(&self.camera).resolution;
        let format = ImageFormat::Rgb8;
        let len = resolution.pixels() * format.bytes_per_pixel();
        RawImage {
            width: resolution.width,
            height: resolution.height,
            format,
            data: Bytes::from(vec![(seq % 256) as u8; len]),
        }
    }
}

impl Default for MockVehicleClient {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleClient for MockVehicleClient {
    #[instrument(name = "mock_vehicle_connect", skip(self), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.record(MockCall::Connect {
            host: host.to_string(),
            port,
        })
        .await?;
        if self.config.refuse_connection {
            return Err(VehicleError::connection(format!(
                "connection refused by {host}:{port}"
            )));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[instrument(name = "mock_vehicle_ping", skip(self))]
    async fn ping(&self) -> Result<()> {
        self.record(MockCall::Ping).await?;
        self.ensure_connected()
    }

    #[instrument(name = "mock_vehicle_enable_api_control", skip(self), fields(enabled, vehicle = %vehicle))]
    async fn enable_api_control(&self, enabled: bool, vehicle: &str) -> Result<()> {
        self.record(MockCall::EnableApiControl(enabled)).await?;
        self.ensure_connected()?;
        self.api_control.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    #[instrument(name = "mock_vehicle_arm_disarm", skip(self), fields(arm, vehicle = %vehicle))]
    async fn arm_disarm(&self, arm: bool, vehicle: &str) -> Result<()> {
        let op = if arm { MockOp::Arm } else { MockOp::Disarm };
        self.record(MockCall::ArmDisarm(arm)).await?;
        self.ensure_connected()?;
        if arm && !self.api_control_enabled() {
            return Err(VehicleError::rejected(op.name(), "api control not enabled"));
        }
        self.armed.store(arm, Ordering::SeqCst);
        Ok(())
    }

    #[instrument(name = "mock_vehicle_takeoff", skip(self), fields(vehicle = %vehicle))]
    async fn takeoff(&self, vehicle: &str) -> Result<()> {
        self.record(MockCall::Takeoff).await?;
        self.ensure_flyable(MockOp::Takeoff)
    }

    #[instrument(name = "mock_vehicle_move_to_z", skip(self), fields(z, speed, vehicle = %vehicle))]
    async fn move_to_z(&self, z: f64, speed: f64, vehicle: &str) -> Result<()> {
        self.record(MockCall::MoveToZ { z, speed }).await?;
        self.ensure_flyable(MockOp::MoveToZ)
    }

    #[instrument(name = "mock_vehicle_move_by_velocity", skip(self, command), fields(vehicle = %vehicle))]
    async fn move_by_velocity(&self, command: MotionCommand, vehicle: &str) -> Result<()> {
        self.record(MockCall::MoveByVelocity(command)).await?;
        self.ensure_flyable(MockOp::MoveByVelocity)
    }

    #[instrument(
        name = "mock_vehicle_set_camera",
        skip(self, settings),
        fields(camera = %camera, resolution = %settings.resolution, fov = settings.fov_degrees)
    )]
    async fn set_camera(&self, camera: &str, settings: CameraSettings, vehicle: &str) -> Result<()> {
        self.record(MockCall::SetCamera(settings)).await?;
        self.ensure_connected()?;
        *lock(&self.camera) = settings;
        Ok(())
    }

    #[instrument(name = "mock_vehicle_capture_image", skip(self), fields(camera = %camera))]
    async fn capture_image(&self, camera: &str, vehicle: &str) -> Result<Option<RawImage>> {
        let seq = self.count(MockOp::CaptureImage);
        self.record(MockCall::CaptureImage).await?;
        self.ensure_connected()?;
        if self.config.empty_captures.contains(&seq) {
            return Ok(None);
        }
        Ok(Some(self.synthesize_image(seq)))
    }

    #[instrument(name = "mock_vehicle_hover", skip(self), fields(vehicle = %vehicle))]
    async fn hover(&self, vehicle: &str) -> Result<()> {
        self.record(MockCall::Hover).await?;
        self.ensure_flyable(MockOp::Hover)
    }

    #[instrument(name = "mock_vehicle_land", skip(self), fields(vehicle = %vehicle))]
    async fn land(&self, vehicle: &str) -> Result<()> {
        self.record(MockCall::Land).await?;
        self.ensure_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::YawMode;

    async fn connected(config: MockConfig) -> MockVehicleClient {
        let mut client = MockVehicleClient::with_config(config);
        client.connect("localhost", 41451).await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_mock_motion_requires_arming() {
        let client = connected(MockConfig::default()).await;

        let err = client.takeoff("Drone1").await.unwrap_err();
        assert!(err.to_string().contains("api control"), "got: {err}");

        client.enable_api_control(true, "Drone1").await.unwrap();
        let err = client.takeoff("Drone1").await.unwrap_err();
        assert!(err.to_string().contains("not armed"), "got: {err}");

        client.arm_disarm(true, "Drone1").await.unwrap();
        client.takeoff("Drone1").await.unwrap();
        assert!(client.is_armed());
    }

    #[tokio::test]
    async fn test_mock_records_calls_in_order() {
        let client = connected(MockConfig::default()).await;
        client.enable_api_control(true, "Drone1").await.unwrap();
        client.arm_disarm(true, "Drone1").await.unwrap();
        client
            .move_by_velocity(
                MotionCommand::world(1.0, 0.0, 0.0, YawMode::angle(0.0), 2.0),
                "Drone1",
            )
            .await
            .unwrap();

        assert_eq!(
            client.ops(),
            vec![
                MockOp::Connect,
                MockOp::EnableApiControl,
                MockOp::Arm,
                MockOp::MoveByVelocity
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_capture_uses_current_camera() {
        let client = connected(MockConfig::default()).await;
        let settings = CameraSettings {
            resolution: Resolution::new(32, 24),
            fov_degrees: 70.0,
        };
        client.set_camera("0", settings, "Drone1").await.unwrap();

        let image = client.capture_image("0", "Drone1").await.unwrap().unwrap();
        assert_eq!((image.width, image.height), (32, 24));
        assert_eq!(image.data.len(), image.expected_len());
    }

    #[tokio::test]
    async fn test_mock_injected_failure_hits_nth_call() {
        let client = connected(MockConfig {
            failures: vec![FaultPoint::nth(MockOp::Ping, 1)],
            ..Default::default()
        })
        .await;

        assert!(client.ping().await.is_ok());
        assert!(client.ping().await.is_err());
        assert!(client.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_empty_capture() {
        let client = connected(MockConfig {
            empty_captures: vec![1],
            ..Default::default()
        })
        .await;

        assert!(client.capture_image("0", "Drone1").await.unwrap().is_some());
        assert!(client.capture_image("0", "Drone1").await.unwrap().is_none());
        assert!(client.capture_image("0", "Drone1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_mock_refused_connection() {
        let mut client = MockVehicleClient::with_config(MockConfig {
            refuse_connection: true,
            ..Default::default()
        });
        let err = client.connect("localhost", 41451).await.unwrap_err();
        assert!(matches!(err, VehicleError::ConnectionFailed { .. }));
        assert!(client.ping().await.is_err());
    }
}
