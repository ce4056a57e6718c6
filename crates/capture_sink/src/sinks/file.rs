//! FileSink - writes each capture as a PNG file

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{CaptureRecord, CaptureSink, ContractError, ImageFormat};
use tracing::{debug, error, instrument};

/// Sink that writes captures to disk
pub struct FileSink {
    name: String,
    output_dir: PathBuf,
    written: usize,
}

impl FileSink {
    /// Create a new FileSink, creating `output_dir` if needed
    pub fn new(name: impl Into<String>, output_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;

        Ok(Self {
            name: name.into(),
            output_dir,
            written: 0,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of files written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Path a record is written to
    pub fn path_for(&self, record: &CaptureRecord) -> PathBuf {
        self.output_dir.join(record.file_name())
    }

    fn save_image(path: &Path, record: &CaptureRecord) -> Result<(), String> {
        let expected = record.resolution.pixels() * record.format.bytes_per_pixel();
        if record.data.len() != expected {
            return Err(format!(
                "buffer holds {} bytes, {} {:?} needs {}",
                record.data.len(),
                record.resolution,
                record.format,
                expected
            ));
        }

        let (width, height) = (record.resolution.width, record.resolution.height);
        let result = match record.format {
            ImageFormat::Rgb8 => {
                image::save_buffer(path, &record.data, width, height, image::ColorType::Rgb8)
            }
            ImageFormat::Bgr8 => {
                // Convert BGR to RGB
                let mut rgb = record.data.to_vec();
                for chunk in rgb.chunks_exact_mut(3) {
                    chunk.swap(0, 2);
                }
                image::save_buffer(path, &rgb, width, height, image::ColorType::Rgb8)
            }
        };
        result.map_err(|e| e.to_string())
    }

    fn persist(&mut self, record: &CaptureRecord) -> Result<PathBuf, ContractError> {
        let path = self.path_for(record);
        Self::save_image(&path, record).map_err(|e| {
            error!(sink = %self.name, path = %path.display(), error = %e, "Write failed");
            ContractError::sink_write(&self.name, e)
        })?;
        self.written += 1;
        Ok(path)
    }
}

impl CaptureSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, record),
        fields(sink = %self.name, regime = %record.regime, index = record.index)
    )]
    async fn write(&mut self, record: &CaptureRecord) -> Result<(), ContractError> {
        let path = self.persist(record)?;
        debug!(path = %path.display(), "capture saved");
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, written = self.written, "FileSink closed");
        Ok(())
    }
}
