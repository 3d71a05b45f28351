//! Sweep record model
//!
//! One `SweepRecord` per acquisition step. Units are normalized once at
//! ingestion (volts → millivolts, fractional accuracy → percent); everything
//! downstream compares millivolts and percentage points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Volts to millivolts
pub const MILLIVOLTS_PER_VOLT: f64 = 1000.0;

/// Fractional accuracy to percent
pub const PERCENT_PER_FRACTION: f64 = 100.0;

/// Outcome of the workload at one voltage step, as logged by the sweep harness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Workload exited cleanly
    Success,
    /// Workload exited with the GUI abort code, which the harness treats as success
    SuccessGuiIgnored,
    /// Workload crashed with a non-zero exit code
    Crash { exit_code: Option<i32> },
    /// Any other status text
    Other(String),
}

impl RunStatus {
    /// Parse the harness status column ("SUCCESS", "CRASH (Exit Code -11)", ...)
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let upper = trimmed.to_ascii_uppercase();

        if upper == "SUCCESS" {
            return Self::Success;
        }
        if upper.starts_with("SUCCESS") && upper.contains("GUI") {
            return Self::SuccessGuiIgnored;
        }
        if upper.starts_with("CRASH") {
            let exit_code = trimmed
                .rsplit(|c: char| c.is_whitespace())
                .next()
                .map(|tail| tail.trim_end_matches(')'))
                .and_then(|code| code.parse::<i32>().ok());
            return Self::Crash { exit_code };
        }

        Self::Other(trimmed.to_string())
    }

    /// Whether the workload crashed at this step
    pub fn is_crash(&self) -> bool {
        matches!(self, Self::Crash { .. })
    }
}

impl fmt::Display for RunStatus {
    /// Renders the status the way the harness writes it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::SuccessGuiIgnored => f.write_str("SUCCESS (GUI Ignored)"),
            Self::Crash {
                exit_code: Some(code),
            } => write!(f, "CRASH (Exit Code {code})"),
            Self::Crash { exit_code: None } => f.write_str("CRASH"),
            Self::Other(text) => f.write_str(text),
        }
    }
}

/// Where the power column came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerSource {
    /// No record carries power
    Absent,
    /// Power measured on the rail during the step
    Measured,
}

/// A single sweep sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    /// Supply voltage in millivolts
    pub voltage_mv: f64,
    /// Model accuracy in percent (0-100)
    pub accuracy_pct: f64,
    /// Average rail power in watts, if measured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f64>,
    /// Average rail current in amps, if measured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_a: Option<f64>,
    /// Workload outcome, if logged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
    /// Workload wall time in seconds, if logged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
    /// Sweep this sample belongs to, assigned by the run segmenter
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<u32>,
}

impl SweepRecord {
    /// Create a record from already-normalized values
    pub fn new(voltage_mv: f64, accuracy_pct: f64) -> Self {
        Self {
            voltage_mv,
            accuracy_pct,
            power_w: None,
            current_a: None,
            status: None,
            duration_s: None,
            run_id: None,
        }
    }

    /// Create a record from raw harness units (volts, fraction 0-1)
    pub fn from_raw(voltage_v: f64, accuracy_fraction: f64) -> Self {
        Self::new(
            voltage_v * MILLIVOLTS_PER_VOLT,
            accuracy_fraction * PERCENT_PER_FRACTION,
        )
    }

    /// Attach a measured power value
    pub fn with_power(mut self, power_w: f64) -> Self {
        self.power_w = Some(power_w);
        self
    }

    /// Attach a measured current value
    pub fn with_current(mut self, current_a: f64) -> Self {
        self.current_a = Some(current_a);
        self
    }

    /// Attach the workload status
    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the workload duration
    pub fn with_duration(mut self, duration_s: f64) -> Self {
        self.duration_s = Some(duration_s);
        self
    }

    /// Run identifier, once segmentation has run
    pub fn run_id(&self) -> Option<u32> {
        self.run_id
    }

    pub(crate) fn set_run_id(&mut self, run_id: u32) {
        self.run_id = Some(run_id);
    }
}

/// Samples in acquisition order
///
/// Never re-sorted or filtered in place; voltage-ordered views are computed
/// copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepDataset {
    records: Vec<SweepRecord>,
}

impl SweepDataset {
    /// Create a dataset from records in acquisition order
    pub fn new(records: Vec<SweepRecord>) -> Self {
        Self { records }
    }

    /// Records in acquisition order
    pub fn records(&self) -> &[SweepRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [SweepRecord] {
        &mut self.records
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no samples
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lowest and highest voltage, or `None` when empty
    pub fn voltage_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.records.iter().map(|r| r.voltage_mv);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Whether any record carries power
    pub fn power_source(&self) -> PowerSource {
        if self.records.iter().any(|r| r.power_w.is_some()) {
            PowerSource::Measured
        } else {
            PowerSource::Absent
        }
    }

    /// Run ids in acquisition order (`None` for unsegmented records)
    pub fn run_ids(&self) -> Vec<Option<u32>> {
        self.records.iter().map(SweepRecord::run_id).collect()
    }
}

impl From<Vec<SweepRecord>> for SweepDataset {
    fn from(records: Vec<SweepRecord>) -> Self {
        Self::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_normalizes_units() {
        let record = SweepRecord::from_raw(0.85, 0.7);
        assert!((record.voltage_mv - 850.0).abs() < 1e-9);
        assert!((record.accuracy_pct - 70.0).abs() < 1e-9);
        assert!(record.power_w.is_none());
        assert!(record.run_id().is_none());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(RunStatus::parse("SUCCESS"), RunStatus::Success);
        assert_eq!(
            RunStatus::parse("SUCCESS (GUI Ignored)"),
            RunStatus::SuccessGuiIgnored
        );
        assert_eq!(
            RunStatus::parse("CRASH (Exit Code -11)"),
            RunStatus::Crash {
                exit_code: Some(-11)
            }
        );
        assert_eq!(
            RunStatus::parse("CRASH"),
            RunStatus::Crash { exit_code: None }
        );
        assert_eq!(
            RunStatus::parse("timeout"),
            RunStatus::Other("timeout".to_string())
        );
    }

    #[test]
    fn test_status_display_matches_harness_text() {
        for raw in ["SUCCESS", "SUCCESS (GUI Ignored)", "CRASH (Exit Code -11)", "timeout"] {
            assert_eq!(RunStatus::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_voltage_range() {
        let dataset = SweepDataset::new(vec![
            SweepRecord::new(850.0, 70.0),
            SweepRecord::new(560.0, 10.0),
            SweepRecord::new(700.0, 69.0),
        ]);
        assert_eq!(dataset.voltage_range(), Some((560.0, 850.0)));
        assert_eq!(SweepDataset::default().voltage_range(), None);
    }

    #[test]
    fn test_power_source() {
        let without = SweepDataset::new(vec![SweepRecord::new(850.0, 70.0)]);
        assert_eq!(without.power_source(), PowerSource::Absent);

        let with = SweepDataset::new(vec![
            SweepRecord::new(850.0, 70.0),
            SweepRecord::new(840.0, 70.0).with_power(3.2),
        ]);
        assert_eq!(with.power_source(), PowerSource::Measured);
    }
}
