// Power efficiency statistics
//
// Representative power at a voltage is the median of samples within a narrow
// window around it. Gains are measured against the power drawn at the highest
// tested voltage. Anything that cannot be computed is an explicit
// `Statistic::Undefined`, never a zero or an infinity.

use crate::analysis::statistics::median;
use crate::record::SweepRecord;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a statistic could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// No sample with power lies within the window around the target voltage
    NoSamplesNearVoltage,
    /// Baseline power is zero, so a relative gain has no meaning
    ZeroBasePower,
    /// A quantity this statistic depends on is itself undefined
    MissingInput,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoSamplesNearVoltage => "no samples near target voltage",
            Self::ZeroBasePower => "zero base power",
            Self::MissingInput => "depends on an undefined value",
        };
        f.write_str(text)
    }
}

/// A statistic that is either a number or explicitly undefined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Statistic {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl Statistic {
    /// The value, if defined
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(*v),
            Self::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

impl fmt::Display for Statistic {
    /// Renders undefined values as "N/A"; precision is honored for numbers
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Self::Undefined(_) => f.write_str("N/A"),
        }
    }
}

/// Power draw at the reference voltages and the resulting savings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerStats {
    /// Power at the highest tested voltage
    pub base_power_w: Statistic,
    /// Power at the knee (or at the floor when no cliff was found)
    pub critical_power_w: Statistic,
    /// Power at the lowest tested voltage
    pub min_power_w: Statistic,
    pub gain_at_critical_pct: Statistic,
    pub gain_at_min_pct: Statistic,
}

/// Median power of samples within `±window_mv` of `target_mv`
pub fn representative_power(
    records: &[SweepRecord],
    target_mv: f64,
    window_mv: f64,
) -> Result<Statistic> {
    let powers: Vec<f64> = records
        .iter()
        .filter(|r| (r.voltage_mv - target_mv).abs() <= window_mv)
        .filter_map(|r| r.power_w)
        .collect();

    Ok(match median(&powers)? {
        Some(power) => Statistic::Defined(power),
        None => Statistic::Undefined(UndefinedReason::NoSamplesNearVoltage),
    })
}

/// Percentage reduction from `base` to `reduced`
pub fn efficiency_gain(base: Statistic, reduced: Statistic) -> Statistic {
    match (base, reduced) {
        (Statistic::Defined(b), _) if b == 0.0 => {
            Statistic::Undefined(UndefinedReason::ZeroBasePower)
        }
        (Statistic::Defined(b), Statistic::Defined(r)) => Statistic::Defined((b - r) / b * 100.0),
        _ => Statistic::Undefined(UndefinedReason::MissingInput),
    }
}

/// Compute power statistics for a sweep
///
/// The critical reference is the knee, except when no cliff was found
/// (`knee == min_v < max_v`), where the sweep floor is the critical point.
pub fn compute_power_stats(
    records: &[SweepRecord],
    knee_voltage_mv: f64,
    min_v: f64,
    max_v: f64,
    window_mv: f64,
) -> Result<PowerStats> {
    let base_power_w = representative_power(records, max_v, window_mv)?;
    let min_power_w = representative_power(records, min_v, window_mv)?;

    let critical_power_w = if knee_voltage_mv == min_v && min_v < max_v {
        min_power_w
    } else {
        representative_power(records, knee_voltage_mv, window_mv)?
    };

    let stats = PowerStats {
        base_power_w,
        critical_power_w,
        min_power_w,
        gain_at_critical_pct: efficiency_gain(base_power_w, critical_power_w),
        gain_at_min_pct: efficiency_gain(base_power_w, min_power_w),
    };

    if let Statistic::Undefined(reason) = stats.gain_at_critical_pct {
        tracing::warn!("Efficiency gain at critical voltage is undefined: {}", reason);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_thirty_percent() {
        let gain = efficiency_gain(Statistic::Defined(10.0), Statistic::Defined(7.0));
        let value = gain.value().unwrap();
        assert!((value - 30.0).abs() < 1e-9, "gain {value}");
    }

    #[test]
    fn test_gain_zero_base_is_undefined() {
        let gain = efficiency_gain(Statistic::Defined(0.0), Statistic::Defined(0.0));
        assert_eq!(gain, Statistic::Undefined(UndefinedReason::ZeroBasePower));
        assert_eq!(gain.to_string(), "N/A");
    }

    #[test]
    fn test_gain_with_undefined_input() {
        let gain = efficiency_gain(
            Statistic::Defined(10.0),
            Statistic::Undefined(UndefinedReason::NoSamplesNearVoltage),
        );
        assert_eq!(gain, Statistic::Undefined(UndefinedReason::MissingInput));
    }

    #[test]
    fn test_representative_power_window() {
        let records = vec![
            SweepRecord::new(600.0, 70.0).with_power(7.0),
            SweepRecord::new(601.5, 70.0).with_power(7.2),
            SweepRecord::new(598.0, 70.0).with_power(6.8),
            SweepRecord::new(603.0, 70.0).with_power(50.0),
        ];
        let power = representative_power(&records, 600.0, 2.0).unwrap();
        assert!((power.value().unwrap() - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_representative_power_no_samples() {
        let records = vec![SweepRecord::new(600.0, 70.0).with_power(7.0)];
        let power = representative_power(&records, 700.0, 2.0).unwrap();
        assert_eq!(
            power,
            Statistic::Undefined(UndefinedReason::NoSamplesNearVoltage)
        );
    }

    #[test]
    fn test_compute_power_stats() {
        let records = vec![
            SweepRecord::new(850.0, 70.0).with_power(10.0),
            SweepRecord::new(600.0, 69.0).with_power(7.0),
            SweepRecord::new(560.0, 5.0).with_power(5.0),
        ];
        let stats = compute_power_stats(&records, 600.0, 560.0, 850.0, 2.0).unwrap();
        assert!((stats.gain_at_critical_pct.value().unwrap() - 30.0).abs() < 1e-4);
        assert!((stats.gain_at_min_pct.value().unwrap() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_cliff_uses_floor_power() {
        let records = vec![
            SweepRecord::new(850.0, 70.0).with_power(10.0),
            SweepRecord::new(560.0, 69.0).with_power(6.0),
        ];
        let stats = compute_power_stats(&records, 560.0, 560.0, 850.0, 2.0).unwrap();
        assert_eq!(stats.critical_power_w, stats.min_power_w);
        assert_eq!(stats.gain_at_critical_pct, stats.gain_at_min_pct);
    }

    #[test]
    fn test_statistic_display_precision() {
        assert_eq!(format!("{:.2}", Statistic::Defined(30.0)), "30.00");
        assert_eq!(
            format!("{:.2}", Statistic::Undefined(UndefinedReason::ZeroBasePower)),
            "N/A"
        );
    }
}
