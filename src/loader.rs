//! Summary table loader
//!
//! Reads the per-step summary written by the sweep harness
//! (`timestamp,voltage,accuracy,status,duration,avg_power_watts,avg_current_amps`)
//! and normalizes it into a `SweepDataset`. Only `voltage` and `accuracy` are
//! required; blank optional cells stay absent. Voltages must be positive and
//! accuracies a fraction in [0, 1].

use crate::record::{RunStatus, SweepDataset, SweepRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Prefix the harness puts in front of the model name in summary file names
pub const SUMMARY_PREFIX: &str = "summary_";

/// Errors raised while turning a summary table into records
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{0}' (table must contain 'voltage' and 'accuracy')")]
    MissingColumn(&'static str),

    #[error("Invalid {column} at row {row}: '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Table has a header but no data rows")]
    Empty,
}

/// Column layout resolved from the header row
#[derive(Debug, Clone, Copy)]
struct Columns {
    voltage: usize,
    accuracy: usize,
    power: Option<usize>,
    current: Option<usize>,
    status: Option<usize>,
    duration: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.trim()));

        Ok(Self {
            voltage: find(&["voltage"]).ok_or(LoadError::MissingColumn("voltage"))?,
            accuracy: find(&["accuracy"]).ok_or(LoadError::MissingColumn("accuracy"))?,
            power: find(&["avg_power_watts", "power_w", "power_watts"]),
            current: find(&["avg_current_amps", "current_a", "current_amps"]),
            status: find(&["status"]),
            duration: find(&["duration"]),
        })
    }
}

/// Pick the delimiter from the file extension (`,` unless `.tsv`/`.txt`)
pub fn delimiter_for(path: &Path) -> u8 {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "tsv" | "txt" => b'\t',
        _ => b',',
    }
}

/// Model name from a summary file name (`summary_ResNet18.csv` → `ResNet18`)
pub fn model_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sweep");

    stem.strip_prefix(SUMMARY_PREFIX).unwrap_or(stem).to_string()
}

/// Load a summary table from disk
pub fn load_summary<P: AsRef<Path>>(path: P) -> Result<SweepDataset, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!("Loading sweep summary from {}", path.display());
    read_summary(file, delimiter_for(path))
}

/// Parse a summary table from any reader
pub fn read_summary<R: Read>(reader: R, delimiter: u8) -> Result<SweepDataset, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(rdr.headers()?)?;

    let mut records = Vec::new();
    for (idx, row) in rdr.records().enumerate() {
        let row = row?;
        let row_number = idx + 1;

        let voltage_v = required(&row, columns.voltage, "voltage", row_number)?;
        if voltage_v <= 0.0 {
            return Err(LoadError::InvalidValue {
                row: row_number,
                column: "voltage",
                value: voltage_v.to_string(),
            });
        }

        let accuracy = required(&row, columns.accuracy, "accuracy", row_number)?;
        if !(0.0..=1.0).contains(&accuracy) {
            return Err(LoadError::InvalidValue {
                row: row_number,
                column: "accuracy",
                value: accuracy.to_string(),
            });
        }

        let mut record = SweepRecord::from_raw(voltage_v, accuracy);

        if let Some(power) = optional(&row, columns.power, "avg_power_watts", row_number)? {
            if power < 0.0 {
                return Err(LoadError::InvalidValue {
                    row: row_number,
                    column: "avg_power_watts",
                    value: power.to_string(),
                });
            }
            record = record.with_power(power);
        }
        if let Some(current) = optional(&row, columns.current, "avg_current_amps", row_number)? {
            record = record.with_current(current);
        }
        if let Some(duration) = optional(&row, columns.duration, "duration", row_number)? {
            record = record.with_duration(duration);
        }
        if let Some(status) = columns
            .status
            .and_then(|i| row.get(i))
            .filter(|s| !s.is_empty())
        {
            record = record.with_status(RunStatus::parse(status));
        }

        records.push(record);
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    tracing::debug!("Loaded {} sweep records", records.len());
    Ok(SweepDataset::new(records))
}

fn parse_finite(raw: &str, column: &'static str, row: usize) -> Result<f64, LoadError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LoadError::InvalidValue {
            row,
            column,
            value: raw.to_string(),
        })
}

fn required(
    row: &csv::StringRecord,
    idx: usize,
    column: &'static str,
    row_number: usize,
) -> Result<f64, LoadError> {
    let raw = row.get(idx).unwrap_or("");
    parse_finite(raw, column, row_number)
}

fn optional(
    row: &csv::StringRecord,
    idx: Option<usize>,
    column: &'static str,
    row_number: usize,
) -> Result<Option<f64>, LoadError> {
    match idx.and_then(|i| row.get(i)) {
        None | Some("") => Ok(None),
        Some(raw) => parse_finite(raw, column, row_number).map(Some),
    }
}
