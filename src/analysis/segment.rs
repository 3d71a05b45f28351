// Run segmentation
//
// The harness sweeps voltage downward, then resets to nominal for the next
// sweep. A rise of more than the jump threshold between consecutive samples
// marks that reset.

use crate::record::SweepDataset;
use serde::{Deserialize, Serialize};

/// Per-run overview for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: u32,
    pub sample_count: usize,
    /// Voltage of the first sample in the run
    pub start_voltage_mv: f64,
    /// Voltage of the last sample in the run
    pub end_voltage_mv: f64,
    pub min_accuracy_pct: f64,
    /// Samples whose logged status is a crash
    pub crash_count: usize,
}

/// Compute run ids for voltages in acquisition order
///
/// The first sample is run 1; the id increments by exactly one whenever a
/// voltage exceeds its predecessor by more than `jump_threshold_mv`.
pub fn segment_voltages(voltages_mv: &[f64], jump_threshold_mv: f64) -> Vec<u32> {
    let mut run_ids = Vec::with_capacity(voltages_mv.len());
    let mut run_id = 1u32;

    for (i, &voltage) in voltages_mv.iter().enumerate() {
        if i > 0 && voltage - voltages_mv[i - 1] > jump_threshold_mv {
            run_id += 1;
        }
        run_ids.push(run_id);
    }

    run_ids
}

/// Attach run ids to every record and return the number of runs
pub fn assign_run_ids(dataset: &mut SweepDataset, jump_threshold_mv: f64) -> u32 {
    let voltages: Vec<f64> = dataset.records().iter().map(|r| r.voltage_mv).collect();
    let run_ids = segment_voltages(&voltages, jump_threshold_mv);

    for (record, run_id) in dataset.records_mut().iter_mut().zip(&run_ids) {
        record.set_run_id(*run_id);
    }

    let run_count = run_ids.last().copied().unwrap_or(0);
    tracing::debug!(
        "Segmented {} samples into {} runs (jump threshold {} mV)",
        voltages.len(),
        run_count,
        jump_threshold_mv
    );
    run_count
}

/// Summarize each run of a segmented dataset
pub fn summarize_runs(dataset: &SweepDataset) -> Vec<RunSummary> {
    let mut summaries: Vec<RunSummary> = Vec::new();

    for record in dataset.records() {
        let Some(run_id) = record.run_id() else {
            continue;
        };
        let crashed = record.status.as_ref().is_some_and(|s| s.is_crash());

        match summaries.last_mut() {
            Some(summary) if summary.run_id == run_id => {
                summary.sample_count += 1;
                summary.end_voltage_mv = record.voltage_mv;
                summary.min_accuracy_pct = summary.min_accuracy_pct.min(record.accuracy_pct);
                summary.crash_count += usize::from(crashed);
            }
            _ => summaries.push(RunSummary {
                run_id,
                sample_count: 1,
                start_voltage_mv: record.voltage_mv,
                end_voltage_mv: record.voltage_mv,
                min_accuracy_pct: record.accuracy_pct,
                crash_count: usize::from(crashed),
            }),
        }
    }

    summaries
}
