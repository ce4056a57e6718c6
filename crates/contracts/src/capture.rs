//! CaptureRecord - Sequencer output
//!
//! Raw camera frames and their provenance.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::Resolution;

/// Pixel layout of a raw frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Rgb8,
    /// AirSim uncompressed scene images
    #[default]
    Bgr8,
}

impl ImageFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb8 | Self::Bgr8 => 3,
        }
    }
}

/// Frame returned by the vehicle camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Raw pixel data (zero-copy)
    pub data: Bytes,
}

impl RawImage {
    /// Size the pixel buffer must have for the declared dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    /// An image with no pixels counts as no image
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

/// One captured frame tagged with the regime it was taken in
///
/// Consumed exactly once by a capture sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// Regime name
    pub regime: String,

    /// Capture index within the regime (0-based)
    pub index: u32,

    /// Resolution the frame was delivered at
    pub resolution: Resolution,

    pub format: ImageFormat,

    pub data: Bytes,
}

impl CaptureRecord {
    pub fn new(regime: impl Into<String>, index: u32, image: RawImage) -> Self {
        Self {
            regime: regime.into(),
            index,
            resolution: Resolution::new(image.width, image.height),
            format: image.format,
            data: image.data,
        }
    }

    /// Deterministic file name: `{regime}_idx{index}_w{width}_h{height}.png`
    pub fn file_name(&self) -> String {
        format!(
            "{}_idx{}_w{}_h{}.png",
            self.regime, self.index, self.resolution.width, self.resolution.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> RawImage {
        RawImage {
            width,
            height,
            format: ImageFormat::Rgb8,
            data: Bytes::from(vec![0u8; width as usize * height as usize * 3]),
        }
    }

    #[test]
    fn test_file_name_tags_regime_index_and_resolution() {
        let record = CaptureRecord::new("slow", 2, image(640, 480));
        assert_eq!(record.file_name(), "slow_idx2_w640_h480.png");
    }

    #[test]
    fn test_expected_len() {
        assert_eq!(image(4, 2).expected_len(), 24);
        let mut bgr = image(4, 2);
        bgr.format = ImageFormat::Bgr8;
        assert_eq!(bgr.expected_len(), 24);
    }

    #[test]
    fn test_empty_image() {
        assert!(image(0, 0).is_empty());
        assert!(!image(1, 1).is_empty());
    }
}
