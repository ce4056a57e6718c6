//! CaptureSink trait - Sequencer output interface
//!
//! Defines the abstract interface for capture sinks.

use crate::{CaptureRecord, ContractError};

/// Capture output trait
///
/// All sink implementations must implement this trait. A failed write costs
/// the mission exactly one capture, never the regime.
#[trait_variant::make(CaptureSink: Send)]
pub trait LocalCaptureSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist one capture record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, record: &CaptureRecord) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
