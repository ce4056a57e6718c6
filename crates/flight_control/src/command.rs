//! Bounded command issue
//!
//! Every remote call goes through [`Commander::issue`]: it awaits the call
//! under the command timeout, classifies the outcome and records metrics.

use std::future::Future;
use std::time::{Duration, Instant};

use observability::{LatencyAggregator, LatencySummary};
use tracing::{debug, warn};

use crate::error::{FlightError, Result, Stage};

#[derive(Debug, Default)]
pub(crate) struct Commander {
    timeout: Option<Duration>,
    latency: LatencyAggregator,
}

impl Commander {
    pub(crate) fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            latency: LatencyAggregator::new(),
        }
    }

    /// Await one remote operation
    ///
    /// # Errors
    /// `CommandFailure` when the session reports an error, `Timeout` when the
    /// call did not resolve within the bound. A timed-out call is abandoned.
    pub(crate) async fn issue<T, F>(&mut self, stage: Stage, call: F) -> Result<T>
    where
        F: Future<Output = vehicle_client::Result<T>>,
    {
        let started = Instant::now();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(%stage, waited = ?limit, "command timed out");
                    observability::record_command_failure(stage.as_str(), "timeout");
                    return Err(FlightError::Timeout {
                        stage,
                        waited: limit,
                    });
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(value) => {
                let elapsed = started.elapsed();
                debug!(%stage, elapsed_ms = elapsed.as_millis() as u64, "command completed");
                observability::record_command(stage.as_str(), elapsed);
                self.latency.push(stage.as_str(), elapsed);
                Ok(value)
            }
            Err(source) => {
                warn!(%stage, error = %source, "command failed");
                observability::record_command_failure(stage.as_str(), "rejected");
                Err(FlightError::CommandFailure { stage, source })
            }
        }
    }

    pub(crate) fn latency(&self) -> LatencySummary {
        self.latency.summary()
    }
}
