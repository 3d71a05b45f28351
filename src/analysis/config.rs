// Configuration for sweep analysis
//
// Every constant of the cliff-detection pipeline is a field here. The defaults
// reproduce the harness conventions: 50 mV run resets, a 5 point accuracy drop,
// 10 mV rounding with a 20 mV buffer, and a ±2 mV power window.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Smallest accepted axis tick step (mV)
pub const MIN_TICK_MV: f64 = 0.1;

/// Configuration for the cliff-detection pipeline
///
/// # Example
/// ```
/// use umbral::analysis::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.knee_drop_pct, 5.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Voltage increase (mV) between consecutive samples that starts a new run
    ///
    /// Sweeps descend monotonically and then reset to a high voltage. Jitter
    /// below this threshold never opens a new run.
    pub run_jump_threshold_mv: f64,

    /// Fraction of the voltage range, measured from the bottom, above which
    /// samples contribute to the baseline
    ///
    /// Default: 0.5 (upper half of the tested range)
    pub baseline_high_fraction: f64,

    /// Absolute accuracy drop (percentage points) below baseline that marks the knee
    pub knee_drop_pct: f64,

    /// Voltages closer than this (mV) are bucketed together by the knee detector
    ///
    /// Default: 0.0 (exact match; harness voltages are millivolt-rounded)
    pub voltage_epsilon_mv: f64,

    /// Buffer (mV) added above the knee before rounding the upper bound
    pub region_buffer_mv: f64,

    /// Rounding granularity (mV) for critical-region bounds
    pub region_rounding_mv: f64,

    /// Windows at most this wide (mV) get the fine tick step
    pub narrow_window_mv: f64,

    /// Tick step (mV) for narrow windows
    pub fine_tick_mv: f64,

    /// Tick step (mV) for wide windows
    pub coarse_tick_mv: f64,

    /// Half-width (mV) of the window used to pick samples for representative power
    pub power_window_mv: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            run_jump_threshold_mv: 50.0,
            baseline_high_fraction: 0.5,
            knee_drop_pct: 5.0,
            voltage_epsilon_mv: 0.0,
            region_buffer_mv: 20.0,
            region_rounding_mv: 10.0,
            narrow_window_mv: 50.0,
            fine_tick_mv: 1.0,
            coarse_tick_mv: 5.0,
            power_window_mv: 2.0,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file
    ///
    /// Missing keys fall back to the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let non_negative = [
            ("run_jump_threshold_mv", self.run_jump_threshold_mv),
            ("knee_drop_pct", self.knee_drop_pct),
            ("voltage_epsilon_mv", self.voltage_epsilon_mv),
            ("region_buffer_mv", self.region_buffer_mv),
            ("narrow_window_mv", self.narrow_window_mv),
            ("power_window_mv", self.power_window_mv),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }

        let positive = [
            ("region_rounding_mv", self.region_rounding_mv),
            ("fine_tick_mv", self.fine_tick_mv),
            ("coarse_tick_mv", self.coarse_tick_mv),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be positive, got {value}"));
            }
        }

        for (name, value) in [
            ("fine_tick_mv", self.fine_tick_mv),
            ("coarse_tick_mv", self.coarse_tick_mv),
        ] {
            if value < MIN_TICK_MV {
                return Err(format!("{name} must be at least {MIN_TICK_MV} mV, got {value}"));
            }
        }

        if !(0.0..=1.0).contains(&self.baseline_high_fraction) {
            return Err(format!(
                "baseline_high_fraction must be in [0, 1], got {}",
                self.baseline_high_fraction
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.run_jump_threshold_mv, 50.0);
        assert_eq!(config.baseline_high_fraction, 0.5);
        assert_eq!(config.knee_drop_pct, 5.0);
        assert_eq!(config.voltage_epsilon_mv, 0.0);
        assert_eq!(config.region_buffer_mv, 20.0);
        assert_eq!(config.region_rounding_mv, 10.0);
        assert_eq!(config.power_window_mv, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AnalysisConfig::from_toml_str("knee_drop_pct = 3.0\n").unwrap();
        assert_eq!(config.knee_drop_pct, 3.0);
        assert_eq!(config.run_jump_threshold_mv, 50.0);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AnalysisConfig::from_toml_str("knee_drop_pct = \"five\"").is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_high_fraction() {
        let mut config = AnalysisConfig::default();
        config.baseline_high_fraction = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_rounding() {
        let mut config = AnalysisConfig::default();
        config.region_rounding_mv = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_negative_threshold() {
        let mut config = AnalysisConfig::default();
        config.run_jump_threshold_mv = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_tick_step_floor() {
        let mut config = AnalysisConfig::default();
        config.fine_tick_mv = 1e-9;
        assert!(config.validate().unwrap_err().contains("fine_tick_mv"));

        config.fine_tick_mv = MIN_TICK_MV;
        assert!(config.validate().is_ok());

        config.coarse_tick_mv = 0.01;
        assert!(config.validate().unwrap_err().contains("coarse_tick_mv"));
    }
}
