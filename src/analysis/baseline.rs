// Baseline accuracy estimation
//
// Baseline = median accuracy over samples in the upper part of the tested
// voltage range, i.e. accuracy not yet affected by undervolting.

use crate::analysis::statistics::{max_value, median, min_value};
use crate::record::SweepRecord;
use anyhow::Result;

/// Baseline accuracy over `records`
///
/// Samples with `voltage_mv >= min_v + high_fraction * (max_v - min_v)` take
/// part. Falls back to the maximum observed accuracy when none qualifies, and
/// returns `None` only for an empty slice.
pub fn estimate_baseline(records: &[SweepRecord], high_fraction: f64) -> Result<Option<f64>> {
    let voltages = || records.iter().map(|r| r.voltage_mv);
    let (Some(min_v), Some(max_v)) = (min_value(voltages()), max_value(voltages())) else {
        return Ok(None);
    };
    let high_cutoff = high_cutoff(min_v, max_v, high_fraction);

    let high_accuracies: Vec<f64> = records
        .iter()
        .filter(|r| r.voltage_mv >= high_cutoff)
        .map(|r| r.accuracy_pct)
        .collect();

    if let Some(baseline) = median(&high_accuracies)? {
        tracing::debug!(
            "Baseline {:.3}% from {} samples at >= {:.1} mV",
            baseline,
            high_accuracies.len(),
            high_cutoff
        );
        return Ok(Some(baseline));
    }

    Ok(max_value(records.iter().map(|r| r.accuracy_pct)))
}

/// Voltage at which the baseline region starts
pub fn high_cutoff(min_v: f64, max_v: f64, high_fraction: f64) -> f64 {
    min_v + high_fraction * (max_v - min_v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(points: &[(f64, f64)]) -> Vec<SweepRecord> {
        points
            .iter()
            .map(|&(v, a)| SweepRecord::new(v, a))
            .collect()
    }

    #[test]
    fn test_baseline_uses_high_half_only() {
        let data = records(&[(900.0, 70.0), (800.0, 72.0), (500.0, 10.0), (450.0, 5.0)]);
        // cutoff = 450 + 0.5 * 450 = 675 → {70, 72}
        assert_eq!(estimate_baseline(&data, 0.5).unwrap(), Some(71.0));
    }

    #[test]
    fn test_baseline_resists_single_outlier() {
        let data = records(&[
            (900.0, 70.0),
            (900.0, 71.0),
            (900.0, 69.0),
            (900.0, 0.0),
            (450.0, 20.0),
        ]);
        let baseline = estimate_baseline(&data, 0.5).unwrap().unwrap();
        assert!((baseline - 69.5).abs() < 1e-3, "baseline {baseline}");
        // The mean of the high half would be 52.5
        assert!(baseline > 65.0);
    }

    #[test]
    fn test_single_voltage_uses_all_samples() {
        let data = records(&[(700.0, 60.0), (700.0, 64.0), (700.0, 62.0)]);
        assert_eq!(estimate_baseline(&data, 0.5).unwrap(), Some(62.0));
    }

    #[test]
    fn test_fraction_above_one_falls_back_to_max() {
        let data = records(&[(900.0, 70.0), (500.0, 80.0)]);
        // cutoff above every sample: no qualifying record
        assert_eq!(estimate_baseline(&data, 1.5).unwrap(), Some(80.0));
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(estimate_baseline(&[], 0.5).unwrap(), None);
    }
}
