//! Flight metrics
//!
//! Command latency, failures and capture outcomes, exported through the
//! `metrics` facade and aggregated in memory for end-of-run summaries.

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::CaptureRecord;
use metrics::{counter, histogram};

/// Record a completed vehicle command
pub fn record_command(stage: &str, latency: Duration) {
    counter!("airsim_pilot_commands_total", "stage" => stage.to_string()).increment(1);
    histogram!("airsim_pilot_command_latency_ms", "stage" => stage.to_string())
        .record(latency.as_secs_f64() * 1000.0);
}

/// Record a failed or timed out vehicle command
pub fn record_command_failure(stage: &str, kind: &str) {
    counter!(
        "airsim_pilot_command_failures_total",
        "stage" => stage.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record a persisted capture
pub fn record_capture_saved(record: &CaptureRecord) {
    counter!(
        "airsim_pilot_captures_total",
        "regime" => record.regime.clone(),
        "status" => "saved"
    )
    .increment(1);
    histogram!("airsim_pilot_capture_bytes").record(record.data.len() as f64);
}

/// Record a capture that produced no stored image
pub fn record_capture_missed(regime: &str) {
    counter!(
        "airsim_pilot_captures_total",
        "regime" => regime.to_string(),
        "status" => "missed"
    )
    .increment(1);
}

/// Record a mission aborted at `stage`
pub fn record_mission_abort(stage: &str) {
    counter!("airsim_pilot_mission_aborts_total", "stage" => stage.to_string()).increment(1);
}

/// Record a dispatched teleop key
pub fn record_teleop_command(key: &str) {
    counter!("airsim_pilot_teleop_commands_total", "key" => key.to_string()).increment(1);
}

/// Per-stage command latency aggregator
///
/// Keeps running statistics in memory for the summary printed after a run.
#[derive(Debug, Clone, Default)]
pub struct LatencyAggregator {
    stages: BTreeMap<String, StageStats>,
}

impl LatencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample for `stage`
    pub fn push(&mut self, stage: &str, latency: Duration) {
        self.stages
            .entry(stage.to_string())
            .or_default()
            .push(latency.as_secs_f64() * 1000.0);
    }

    /// Generate summary report
    pub fn summary(&self) -> LatencySummary {
        LatencySummary {
            stages: self
                .stages
                .iter()
                .map(|(stage, stats)| (stage.clone(), stats.summary()))
                .collect(),
        }
    }
}

/// Command latency per stage, in milliseconds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencySummary {
    pub stages: BTreeMap<String, StatsSummary>,
}

impl LatencySummary {
    /// Number of recorded commands across all stages
    pub fn total_commands(&self) -> u64 {
        self.stages.values().map(|s| s.count).sum()
    }
}

impl std::fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Command latency (ms):")?;
        for (stage, stats) in &self.stages {
            writeln!(f, "  {stage}: {stats}")?;
        }
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Latency samples of one stage, folded with Welford's update
#[derive(Debug, Clone, Default)]
pub(crate) struct StageStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl StageStats {
    pub(crate) fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub(crate) fn summary(&self) -> StatsSummary {
        let variance = if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        };
        StatsSummary {
            count: self.count,
            min: self.min,
            max: self.max,
            mean: self.mean,
            std_dev: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_stats_summary() {
        let mut stats = StageStats::default();
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        let summary = stats.summary();
        assert_eq!(summary.count, 5);
        assert!((summary.mean - 3.0).abs() < 1e-10);
        assert!((summary.min - 1.0).abs() < 1e-10);
        assert!((summary.max - 5.0).abs() < 1e-10);
        assert!((summary.std_dev - 2.5f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_single_sample_has_no_spread() {
        let mut stats = StageStats::default();
        stats.push(42.0);
        let summary = stats.summary();
        assert_eq!((summary.min, summary.max, summary.mean), (42.0, 42.0, 42.0));
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn test_latency_aggregator_groups_by_stage() {
        let mut aggregator = LatencyAggregator::new();
        aggregator.push("takeoff", Duration::from_millis(100));
        aggregator.push("capture", Duration::from_millis(10));
        aggregator.push("capture", Duration::from_millis(30));

        let summary = aggregator.summary();
        assert_eq!(summary.total_commands(), 3);
        let capture = &summary.stages["capture"];
        assert_eq!(capture.count, 2);
        assert!((capture.mean - 20.0).abs() < 1e-9);
        assert!(summary.to_string().contains("takeoff"));
    }

    #[test]
    fn test_empty_stats_display() {
        assert_eq!(StatsSummary::default().to_string(), "N/A");
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: calls are no-ops
        record_command("ping", Duration::from_millis(1));
        record_command_failure("takeoff", "timeout");
        record_capture_missed("slow");
        record_mission_abort("takeoff");
        record_teleop_command("w");
    }
}
