// Critical-region bounding
//
// One bounding algorithm, several presentations. `bound_critical_region`
// turns the knee into a rounded voltage window; a `RegionFraming` then shapes
// that window for a given view (voltage axis with ticks, or power axis).

use crate::analysis::config::AnalysisConfig;
use crate::analysis::statistics::{max_value, min_value};
use crate::record::SweepRecord;
use serde::{Deserialize, Serialize};

/// Inclusive voltage window around the knee
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalRegion {
    pub upper_bound_mv: f64,
    pub lower_bound_mv: f64,
}

impl CriticalRegion {
    /// Window width in millivolts
    pub fn width_mv(&self) -> f64 {
        (self.upper_bound_mv - self.lower_bound_mv).abs()
    }

    /// Whether a voltage falls inside the window (bounds included)
    pub fn contains(&self, voltage_mv: f64) -> bool {
        voltage_mv >= self.lower_bound_mv && voltage_mv <= self.upper_bound_mv
    }

    /// Whether the window collapsed to a single point
    pub fn is_point(&self) -> bool {
        self.upper_bound_mv == self.lower_bound_mv
    }
}

/// Compute the critical window for a knee within `[min_v, max_v]`
///
/// - upper = ceil((knee + buffer) / step) * step, capped at ceil(max_v / step) * step
/// - lower = floor(min_v / step) * step
///
/// A single-voltage dataset collapses to the one point `[v, v]`.
pub fn bound_critical_region(
    knee_voltage_mv: f64,
    min_v: f64,
    max_v: f64,
    config: &AnalysisConfig,
) -> CriticalRegion {
    if max_v - min_v <= config.voltage_epsilon_mv {
        return CriticalRegion {
            upper_bound_mv: min_v,
            lower_bound_mv: min_v,
        };
    }

    let step = config.region_rounding_mv;
    let ceiling = (max_v / step).ceil() * step;
    let upper = (((knee_voltage_mv + config.region_buffer_mv) / step).ceil() * step).min(ceiling);
    let lower = (min_v / step).floor() * step;

    CriticalRegion {
        upper_bound_mv: upper.max(lower),
        lower_bound_mv: lower,
    }
}

/// Presentation of a critical region for one kind of view
pub trait RegionFraming {
    type Output;

    fn frame(&self, region: &CriticalRegion, records: &[SweepRecord]) -> Self::Output;
}

/// Accuracy-vs-voltage presentation: bounds plus an axis tick step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageWindow {
    pub upper_bound_mv: f64,
    pub lower_bound_mv: f64,
    pub tick_step_mv: f64,
}

impl VoltageWindow {
    /// The bare bounds
    pub fn region(&self) -> CriticalRegion {
        CriticalRegion {
            upper_bound_mv: self.upper_bound_mv,
            lower_bound_mv: self.lower_bound_mv,
        }
    }
}

/// Frames a region on a voltage axis, picking dense ticks for narrow windows
#[derive(Debug, Clone, Copy)]
pub struct VoltageFraming {
    pub narrow_window_mv: f64,
    pub fine_tick_mv: f64,
    pub coarse_tick_mv: f64,
}

impl VoltageFraming {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            narrow_window_mv: config.narrow_window_mv,
            fine_tick_mv: config.fine_tick_mv,
            coarse_tick_mv: config.coarse_tick_mv,
        }
    }
}

impl RegionFraming for VoltageFraming {
    type Output = VoltageWindow;

    fn frame(&self, region: &CriticalRegion, _records: &[SweepRecord]) -> VoltageWindow {
        let tick_step_mv = if region.width_mv() <= self.narrow_window_mv {
            self.fine_tick_mv
        } else {
            self.coarse_tick_mv
        };

        VoltageWindow {
            upper_bound_mv: region.upper_bound_mv,
            lower_bound_mv: region.lower_bound_mv,
            tick_step_mv,
        }
    }
}

/// Accuracy-vs-power presentation: bounds plus the power span inside them
///
/// No tick step; the axis shows watts, reversed so high power comes first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerWindow {
    pub upper_bound_mv: f64,
    pub lower_bound_mv: f64,
    pub max_power_w: Option<f64>,
    pub min_power_w: Option<f64>,
    pub reversed_axis: bool,
}

/// Frames a region on a power axis
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerFraming;

impl RegionFraming for PowerFraming {
    type Output = PowerWindow;

    fn frame(&self, region: &CriticalRegion, records: &[SweepRecord]) -> PowerWindow {
        let powers = || {
            records
                .iter()
                .filter(|r| region.contains(r.voltage_mv))
                .filter_map(|r| r.power_w)
        };

        PowerWindow {
            upper_bound_mv: region.upper_bound_mv,
            lower_bound_mv: region.lower_bound_mv,
            max_power_w: max_value(powers()),
            min_power_w: min_value(powers()),
            reversed_axis: true,
        }
    }
}
