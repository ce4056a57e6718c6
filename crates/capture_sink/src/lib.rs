//! # Capture Sink
//!
//! Destinations for capture records.
//!
//! - `FileSink`: one PNG per capture, named after regime, index and resolution
//! - `LogSink`: logs a summary per capture, writes nothing

pub mod sinks;

pub use contracts::{CaptureRecord, CaptureSink};
pub use sinks::{FileSink, LogSink};
