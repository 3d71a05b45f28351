// Undervolt sweep analysis: where does accuracy fall off the cliff?
//
// Pipeline, in order:
// 1. Run segmentation   - split acquisition order into descending sweeps
// 2. Baseline           - median accuracy over the upper half of the voltage range
// 3. Knee detection     - highest voltage whose worst sample drops below baseline - 5
// 4. Critical region    - rounded window around the knee, plus axis framing
// 5. Power statistics   - representative power at max/knee/min voltage and gains
//
// Each call is independent and deterministic; the only mutation is attaching
// run ids to the caller's dataset.

mod baseline;
mod config;
mod knee;
mod power;
mod region;
mod segment;
pub mod statistics;

pub use baseline::{estimate_baseline, high_cutoff};
pub use config::{AnalysisConfig, MIN_TICK_MV};
pub use knee::{detect_knee, voltage_levels, KneeDetection, VoltageLevel};
pub use power::{
    compute_power_stats, efficiency_gain, representative_power, PowerStats, Statistic,
    UndefinedReason,
};
pub use region::{
    bound_critical_region, CriticalRegion, PowerFraming, PowerWindow, RegionFraming,
    VoltageFraming, VoltageWindow,
};
pub use segment::{assign_run_ids, segment_voltages, summarize_runs, RunSummary};

use crate::record::{PowerSource, SweepDataset};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Result of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sample_count: usize,
    pub run_count: u32,
    pub min_voltage_mv: f64,
    pub max_voltage_mv: f64,
    pub baseline_accuracy_pct: f64,
    /// Accuracy below which a voltage counts as collapsed
    pub drop_threshold_pct: f64,
    pub knee_voltage_mv: f64,
    /// False when no collapse was observed and the knee is the lowest voltage
    pub cliff_detected: bool,
    pub critical_region: VoltageWindow,
    /// Present only when at least one sample carries power
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_stats: Option<PowerStats>,
    pub runs: Vec<RunSummary>,
}

impl AnalysisResult {
    fn empty(config: &AnalysisConfig) -> Self {
        Self {
            sample_count: 0,
            run_count: 0,
            min_voltage_mv: 0.0,
            max_voltage_mv: 0.0,
            baseline_accuracy_pct: 0.0,
            drop_threshold_pct: -config.knee_drop_pct,
            knee_voltage_mv: 0.0,
            cliff_detected: false,
            critical_region: VoltageWindow {
                upper_bound_mv: 0.0,
                lower_bound_mv: 0.0,
                tick_step_mv: config.fine_tick_mv,
            },
            power_stats: None,
            runs: Vec::new(),
        }
    }

    /// The bare critical-region bounds
    pub fn region(&self) -> CriticalRegion {
        self.critical_region.region()
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        if self.sample_count == 0 {
            report.push_str("⚠️  NO SAMPLES\n\nThe sweep table contained no records.\n");
            return report;
        }

        if self.cliff_detected {
            report.push_str(&format!(
                "📉 ACCURACY CLIFF AT {:.1} mV\n\n",
                self.knee_voltage_mv
            ));
        } else {
            report.push_str(&format!(
                "✅ NO CLIFF WITHIN TESTED RANGE (floor {:.1} mV)\n\n",
                self.knee_voltage_mv
            ));
        }

        report.push_str(&format!(
            "Samples: {} across {} run(s)\n",
            self.sample_count, self.run_count
        ));
        report.push_str(&format!(
            "Voltage range: {:.1} - {:.1} mV\n",
            self.min_voltage_mv, self.max_voltage_mv
        ));
        report.push_str(&format!(
            "Baseline accuracy: {:.2}% (drop threshold {:.2}%)\n",
            self.baseline_accuracy_pct, self.drop_threshold_pct
        ));
        report.push_str(&format!(
            "Critical region: {:.0} - {:.0} mV (tick {} mV)\n",
            self.critical_region.upper_bound_mv,
            self.critical_region.lower_bound_mv,
            self.critical_region.tick_step_mv
        ));

        match &self.power_stats {
            Some(stats) => {
                report.push_str("\n⚡ Power:\n");
                report.push_str(&format!("  Base power:        {:.3} W\n", stats.base_power_w));
                report.push_str(&format!(
                    "  Critical power:    {:.3} W\n",
                    stats.critical_power_w
                ));
                report.push_str(&format!("  Minimum power:     {:.3} W\n", stats.min_power_w));
                report.push_str(&format!(
                    "  Gain at critical:  {:.2}%\n",
                    stats.gain_at_critical_pct
                ));
                report.push_str(&format!(
                    "  Gain at minimum:   {:.2}%\n",
                    stats.gain_at_min_pct
                ));
            }
            None => report.push_str("\n⚡ Power: not measured\n"),
        }

        if !self.runs.is_empty() {
            report.push_str("\n📊 Runs:\n");
            for run in &self.runs {
                report.push_str(&format!(
                    "  Run {}: {} samples, {:.1} -> {:.1} mV, min accuracy {:.2}%, crashes {}\n",
                    run.run_id,
                    run.sample_count,
                    run.start_voltage_mv,
                    run.end_voltage_mv,
                    run.min_accuracy_pct,
                    run.crash_count
                ));
            }
        }

        report
    }
}

/// Run the full pipeline over `dataset`, attaching run ids to its records
///
/// # Example
/// ```
/// use umbral::analysis::{analyze, AnalysisConfig};
/// use umbral::record::{SweepDataset, SweepRecord};
///
/// let mut dataset = SweepDataset::new(vec![
///     SweepRecord::new(900.0, 70.0),
///     SweepRecord::new(800.0, 71.0),
///     SweepRecord::new(700.0, 69.0),
///     SweepRecord::new(600.0, 65.0),
///     SweepRecord::new(500.0, 10.0),
/// ]);
///
/// let result = analyze(&mut dataset, &AnalysisConfig::default()).unwrap();
/// assert_eq!(result.knee_voltage_mv, 500.0);
/// assert_eq!(result.critical_region.upper_bound_mv, 520.0);
/// ```
pub fn analyze(dataset: &mut SweepDataset, config: &AnalysisConfig) -> Result<AnalysisResult> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    // Step 1: segment into runs
    let run_count = assign_run_ids(dataset, config.run_jump_threshold_mv);

    let Some((min_v, max_v)) = dataset.voltage_range() else {
        tracing::warn!("Empty sweep dataset; nothing to analyze");
        return Ok(AnalysisResult::empty(config));
    };
    let records = dataset.records();

    // Step 2: baseline
    let baseline = estimate_baseline(records, config.baseline_high_fraction)?
        .ok_or_else(|| anyhow::anyhow!("Baseline undefined for a non-empty dataset"))?;

    // Step 3: knee
    let knee = detect_knee(
        records,
        baseline,
        config.knee_drop_pct,
        config.voltage_epsilon_mv,
    )
    .ok_or_else(|| anyhow::anyhow!("Knee undefined for a non-empty dataset"))?;

    // Step 4: critical region
    let region = bound_critical_region(knee.knee_voltage_mv, min_v, max_v, config);
    let critical_region = VoltageFraming::from_config(config).frame(&region, records);

    // Step 5: power statistics
    let power_stats = match dataset.power_source() {
        PowerSource::Measured => Some(compute_power_stats(
            records,
            knee.knee_voltage_mv,
            min_v,
            max_v,
            config.power_window_mv,
        )?),
        PowerSource::Absent => {
            tracing::debug!("No power column; skipping efficiency statistics");
            None
        }
    };

    tracing::info!(
        "Analyzed {} samples: baseline {:.2}%, knee {:.1} mV, window {:.0}-{:.0} mV",
        records.len(),
        baseline,
        knee.knee_voltage_mv,
        critical_region.upper_bound_mv,
        critical_region.lower_bound_mv
    );

    Ok(AnalysisResult {
        sample_count: records.len(),
        run_count,
        min_voltage_mv: min_v,
        max_voltage_mv: max_v,
        baseline_accuracy_pct: baseline,
        drop_threshold_pct: knee.drop_threshold_pct,
        knee_voltage_mv: knee.knee_voltage_mv,
        cliff_detected: knee.cliff_detected,
        critical_region,
        power_stats,
        runs: summarize_runs(dataset),
    })
}
