//! Real AirSim client implementation
//!
//! Talks msgpack-rpc to the AirSim multirotor RPC server.

use bytes::Bytes;
use contracts::{CameraSettings, ImageFormat, MotionCommand, RawImage, VelocityFrame, YawMode};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use tracing::{debug, info, instrument, warn};

use crate::client::VehicleClient;
use crate::error::{Result, VehicleError};
use crate::rpc::RpcSession;

/// Server-side timeout for takeoff (seconds)
const TAKEOFF_TIMEOUT_SECS: f64 = 20.0;
/// Server-side timeout for landing (seconds)
const LAND_TIMEOUT_SECS: f64 = 60.0;
/// "No timeout" as understood by the server
const NO_TIMEOUT_SECS: f64 = 3e38;
/// `DrivetrainType::MaxDegreeOfFreedom`
const DRIVETRAIN_MAX_DOF: u8 = 0;
/// Empty msgpack-rpc parameter array
const NO_PARAMS: [u8; 0] = [];
/// `ImageType::Scene`
const IMAGE_TYPE_SCENE: u8 = 0;

/// Result slot of motion calls: `bool` on most servers, nil on some
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Ack {
    Flag(bool),
    Other(IgnoredAny),
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    camera_name: &'a str,
    image_type: u8,
    pixels_as_float: bool,
    compress: bool,
}

/// Subset of AirSim's `ImageResponse` that uncompressed scene captures need
#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    image_data_uint8: ByteBuf,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

impl ImageResponse {
    fn into_raw(self) -> Option<RawImage> {
        if self.width == 0 || self.height == 0 || self.image_data_uint8.is_empty() {
            return None;
        }
        Some(RawImage {
            width: self.width,
            height: self.height,
            format: ImageFormat::Bgr8,
            data: Bytes::from(self.image_data_uint8.into_vec()),
        })
    }
}

/// Real AirSim client
///
/// Wraps one msgpack-rpc session; methods take `&self` and serialize on the
/// session's transport lock.
pub struct AirSimClient {
    session: RpcSession,
}

impl AirSimClient {
    /// Create new client (disconnected state)
    pub fn new() -> Self {
        Self {
            session: RpcSession::new(),
        }
    }

    /// Issue a call whose result is an acknowledgement flag
    ///
    /// A `false` flag is reported as a rejection.
    async fn acked<P: Serialize + Send>(&self, method: &str, params: P) -> Result<()> {
        match self.session.call::<P, Ack>(method, params).await? {
            Some(Ack::Flag(false)) => Err(VehicleError::rejected(
                method,
                "simulator returned false",
            )),
            Some(Ack::Flag(true)) | Some(Ack::Other(_)) | None => Ok(()),
        }
    }
}

impl Default for AirSimClient {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleClient for AirSimClient {
    #[instrument(name = "airsim_connect", skip(self), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.session.connect(host, port).await?;
        info!("connected to AirSim at {}:{}", host, port);
        Ok(())
    }

    #[instrument(name = "airsim_ping", skip(self))]
    async fn ping(&self) -> Result<()> {
        self.acked("ping", NO_PARAMS).await
    }

    #[instrument(name = "airsim_enable_api_control", skip(self))]
    async fn enable_api_control(&self, enabled: bool, vehicle: &str) -> Result<()> {
        self.acked("enableApiControl", (enabled, vehicle)).await
    }

    #[instrument(name = "airsim_arm_disarm", skip(self))]
    async fn arm_disarm(&self, arm: bool, vehicle: &str) -> Result<()> {
        self.acked("armDisarm", (arm, vehicle)).await
    }

    #[instrument(name = "airsim_takeoff", skip(self))]
    async fn takeoff(&self, vehicle: &str) -> Result<()> {
        self.acked("takeoff", (TAKEOFF_TIMEOUT_SECS, vehicle)).await
    }

    #[instrument(name = "airsim_move_to_z", skip(self))]
    async fn move_to_z(&self, z: f64, speed: f64, vehicle: &str) -> Result<()> {
        let params = (z, speed, NO_TIMEOUT_SECS, YawMode::default(), -1.0, 1.0, vehicle);
        self.acked("moveToZ", params).await
    }

    #[instrument(
        name = "airsim_move_by_velocity",
        skip(self, command),
        fields(vx = command.vx, vy = command.vy, vz = command.vz, frame = ?command.frame)
    )]
    async fn move_by_velocity(&self, command: MotionCommand, vehicle: &str) -> Result<()> {
        let method = match command.frame {
            VelocityFrame::World => "moveByVelocity",
            VelocityFrame::Body => "moveByVelocityBodyFrame",
        };
        let params = (
            command.vx,
            command.vy,
            command.vz,
            command.duration_secs,
            DRIVETRAIN_MAX_DOF,
            command.yaw,
            vehicle,
        );
        self.acked(method, params).await
    }

    #[instrument(
        name = "airsim_set_camera",
        skip(self, settings),
        fields(resolution = %settings.resolution, fov = settings.fov_degrees)
    )]
    async fn set_camera(&self, camera: &str, settings: CameraSettings, vehicle: &str) -> Result<()> {
        self.acked(
            "simSetCameraFov",
            (camera, settings.fov_degrees, vehicle, false),
        )
        .await?;
        let resolution = settings.resolution;
        self.acked(
            "simSetCameraResolution",
            (camera, resolution.width, resolution.height, vehicle, false),
        )
        .await?;
        debug!("camera configured");
        Ok(())
    }

    #[instrument(name = "airsim_capture_image", skip(self))]
    async fn capture_image(&self, camera: &str, vehicle: &str) -> Result<Option<RawImage>> {
        let request = ImageRequest {
            camera_name: camera,
            image_type: IMAGE_TYPE_SCENE,
            pixels_as_float: false,
            compress: false,
        };
        let responses: Option<Vec<ImageResponse>> = self
            .session
            .call("simGetImages", (vec![request], vehicle, false))
            .await?;

        let image = responses
            .and_then(|r| r.into_iter().next())
            .and_then(ImageResponse::into_raw);
        if image.is_none() {
            warn!("simulator returned no image data");
        }
        Ok(image)
    }

    #[instrument(name = "airsim_hover", skip(self))]
    async fn hover(&self, vehicle: &str) -> Result<()> {
        self.acked("hover", (vehicle,)).await
    }

    #[instrument(name = "airsim_land", skip(self))]
    async fn land(&self, vehicle: &str) -> Result<()> {
        self.acked("land", (LAND_TIMEOUT_SECS, vehicle)).await
    }
}
