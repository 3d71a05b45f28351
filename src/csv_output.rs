//! CSV output format for analyzed sweeps
//!
//! One row per sample in acquisition order, annotated with its run id and
//! whether it lies inside the critical region.

use crate::analysis::CriticalRegion;
use crate::record::{RunStatus, SweepRecord};

/// CSV row for a single sweep sample
#[derive(Debug, Clone)]
pub struct CsvSample {
    pub run_id: Option<u32>,
    pub voltage_mv: f64,
    pub accuracy_pct: f64,
    pub power_w: Option<f64>,
    pub status: Option<String>,
    pub in_critical_region: bool,
}

impl CsvSample {
    /// Build a row from a record and the critical window
    pub fn from_record(record: &SweepRecord, region: &CriticalRegion) -> Self {
        Self {
            run_id: record.run_id(),
            voltage_mv: record.voltage_mv,
            accuracy_pct: record.accuracy_pct,
            power_w: record.power_w,
            status: record.status.as_ref().map(RunStatus::to_string),
            in_critical_region: region.contains(record.voltage_mv),
        }
    }
}

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput {
    samples: Vec<CsvSample>,
    include_status: bool,
}

impl CsvOutput {
    /// Create a new CSV output formatter
    pub fn new(include_status: bool) -> Self {
        Self {
            samples: Vec::new(),
            include_status,
        }
    }

    /// Build a formatter holding every record of a sweep
    pub fn from_records(records: &[SweepRecord], region: &CriticalRegion) -> Self {
        let include_status = records.iter().any(|r| r.status.is_some());
        let mut output = Self::new(include_status);
        for record in records {
            output.add_sample(CsvSample::from_record(record, region));
        }
        output
    }

    /// Add a sample to the output
    pub fn add_sample(&mut self, sample: CsvSample) {
        self.samples.push(sample);
    }

    /// Generate CSV header row based on enabled columns
    fn header(&self) -> String {
        let mut headers = vec![
            "run_id",
            "voltage_mv",
            "accuracy_pct",
            "power_w",
            "in_critical_region",
        ];

        if self.include_status {
            headers.push("status");
        }

        headers.join(",")
    }

    /// Escape CSV field (handle commas, quotes, line breaks)
    fn escape_field(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Format a sample as CSV row
    fn format_sample(&self, sample: &CsvSample) -> String {
        let mut fields = vec![
            sample.run_id.map(|id| id.to_string()).unwrap_or_default(),
            sample.voltage_mv.to_string(),
            sample.accuracy_pct.to_string(),
            sample.power_w.map(|p| p.to_string()).unwrap_or_default(),
            sample.in_critical_region.to_string(),
        ];

        if self.include_status {
            fields.push(
                sample
                    .status
                    .as_deref()
                    .map(Self::escape_field)
                    .unwrap_or_default(),
            );
        }

        fields.join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for sample in &self.samples {
            output.push_str(&self.format_sample(sample));
            output.push('\n');
        }

        output
    }
}
