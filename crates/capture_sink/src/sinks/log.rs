//! LogSink - logs capture summaries via tracing

use contracts::{CaptureRecord, CaptureSink, ContractError};
use tracing::{info, instrument};

/// Sink that logs capture summaries instead of storing them
pub struct LogSink {
    name: String,
    seen: usize,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seen: 0,
        }
    }

    /// Number of records logged
    pub fn seen(&self) -> usize {
        self.seen
    }

    fn log_record_summary(&self, record: &CaptureRecord) {
        info!(
            sink = %self.name,
            regime = %record.regime,
            index = record.index,
            resolution = %record.resolution,
            format = ?record.format,
            bytes = record.data.len(),
            file = %record.file_name(),
            "Capture received"
        );
    }
}

impl CaptureSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, record),
        fields(sink = %self.name, regime = %record.regime, index = record.index)
    )]
    async fn write(&mut self, record: &CaptureRecord) -> Result<(), ContractError> {
        self.log_record_summary(record);
        self.seen += 1;
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, seen = self.seen, "LogSink closed");
        Ok(())
    }
}
