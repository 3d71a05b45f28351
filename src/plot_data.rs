//! Plot-ready figure specifications
//!
//! Nothing is drawn here. Each `FigureSpec` carries the series, axis limits,
//! ticks and labels an external renderer needs for one tab: the full overview,
//! the zoomed critical region, and (with power data) accuracy versus power.

use crate::analysis::{AnalysisResult, PowerFraming, RegionFraming};
use crate::record::{SweepDataset, SweepRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overview x-axis tick step (mV)
pub const OVERVIEW_TICK_MV: f64 = 10.0;

/// Accuracy axis: 0 to 118 %, ticks every 12.5 up to 112.5
pub const ACCURACY_AXIS_MAX: f64 = 118.0;
pub const ACCURACY_TICK_STEP: f64 = 12.5;
pub const ACCURACY_TICK_MAX: f64 = 112.5;

/// Upper bound on ticks per axis; longer ranges keep only their endpoints
pub const MAX_AXIS_TICKS: usize = 10_000;

/// Which figure a `FigureSpec` describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    Overview,
    CriticalRegion,
    AccuracyVsPower,
}

/// One axis of a figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub label: String,
    /// First limit as drawn (greater than `end` for reversed axes)
    pub start: f64,
    pub end: f64,
    pub ticks: Vec<f64>,
    pub reversed: bool,
}

/// Points of one sweep run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub run_id: u32,
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Everything a renderer needs to draw one figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    pub kind: FigureKind,
    pub title: String,
    pub subtitle: String,
    pub file_name: String,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub series: Vec<Series>,
}

/// Inclusive range from `start` toward `end` in steps of `step`
///
/// Walks downward when `start > end`. A zero or non-finite step yields just
/// `start`; a range needing more than `MAX_AXIS_TICKS` ticks yields
/// `[start, end]`.
pub fn axis_ticks(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 || !start.is_finite() || !end.is_finite() {
        return vec![start];
    }

    let span = (end - start).abs();
    let steps = (span / step + 1e-9).floor();
    if steps >= MAX_AXIS_TICKS as f64 {
        return vec![start, end];
    }
    let count = steps as usize;
    let direction = if end < start { -1.0 } else { 1.0 };

    (0..=count)
        .map(|i| start + direction * step * i as f64)
        .collect()
}

fn accuracy_axis() -> AxisSpec {
    AxisSpec {
        label: "Accuracy (%)".to_string(),
        start: 0.0,
        end: ACCURACY_AXIS_MAX,
        ticks: axis_ticks(0.0, ACCURACY_TICK_MAX, ACCURACY_TICK_STEP),
        reversed: false,
    }
}

/// Group records by run id, projecting each to (x, accuracy)
fn series_by_run<'a>(
    records: impl IntoIterator<Item = &'a SweepRecord>,
    x_of: impl Fn(&SweepRecord) -> Option<f64>,
) -> Vec<Series> {
    let mut grouped: BTreeMap<u32, Series> = BTreeMap::new();

    for record in records {
        let Some(x) = x_of(record) else {
            continue;
        };
        let run_id = record.run_id().unwrap_or(1);
        let series = grouped.entry(run_id).or_insert_with(|| Series {
            run_id,
            label: format!("Run {run_id}"),
            x: Vec::new(),
            y: Vec::new(),
        });
        series.x.push(x);
        series.y.push(record.accuracy_pct);
    }

    grouped.into_values().collect()
}

/// Build the figure set for an analyzed dataset
///
/// The power figure is only produced when the result carries power statistics.
pub fn build_figures(
    model: &str,
    dataset: &SweepDataset,
    result: &AnalysisResult,
) -> Vec<FigureSpec> {
    let mut figures = Vec::with_capacity(3);
    let records = dataset.records();
    let region = result.region();

    let overview_start = (result.max_voltage_mv / OVERVIEW_TICK_MV).ceil() * OVERVIEW_TICK_MV;
    let overview_end = (result.min_voltage_mv / OVERVIEW_TICK_MV).floor() * OVERVIEW_TICK_MV;
    figures.push(FigureSpec {
        kind: FigureKind::Overview,
        title: model.to_string(),
        subtitle: "Undervolt Results".to_string(),
        file_name: format!("{model}_Overview.png"),
        x_axis: AxisSpec {
            label: "Voltage (mV)".to_string(),
            start: overview_start,
            end: overview_end,
            ticks: axis_ticks(overview_start, overview_end, OVERVIEW_TICK_MV),
            reversed: true,
        },
        y_axis: accuracy_axis(),
        series: series_by_run(records, |r| Some(r.voltage_mv)),
    });

    let window = result.critical_region;
    let in_window = || records.iter().filter(|r| region.contains(r.voltage_mv));
    figures.push(FigureSpec {
        kind: FigureKind::CriticalRegion,
        title: model.to_string(),
        subtitle: "Undervolt Results (Critical Region)".to_string(),
        file_name: format!("{model}_Critical_Region.png"),
        x_axis: AxisSpec {
            label: "Voltage (mV)".to_string(),
            start: window.upper_bound_mv,
            end: window.lower_bound_mv,
            ticks: axis_ticks(
                window.upper_bound_mv,
                window.lower_bound_mv,
                window.tick_step_mv,
            ),
            reversed: true,
        },
        y_axis: accuracy_axis(),
        series: series_by_run(in_window(), |r| Some(r.voltage_mv)),
    });

    if result.power_stats.is_some() {
        let power_window = PowerFraming.frame(&region, records);
        let (start, end) = match (power_window.max_power_w, power_window.min_power_w) {
            (Some(hi), Some(lo)) => (hi, lo),
            _ => (0.0, 0.0),
        };
        figures.push(FigureSpec {
            kind: FigureKind::AccuracyVsPower,
            title: model.to_string(),
            subtitle: "Accuracy vs Power (Critical Region)".to_string(),
            file_name: format!("{model}_Accuracy_vs_Power.png"),
            x_axis: AxisSpec {
                label: "Power (W)".to_string(),
                start,
                end,
                ticks: Vec::new(),
                reversed: power_window.reversed_axis,
            },
            y_axis: accuracy_axis(),
            series: series_by_run(in_window(), |r| r.power_w),
        });
    }

    figures
}
