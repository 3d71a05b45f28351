// Knee (cliff) detection
//
// Walk the distinct voltages from the top down and stop at the first one whose
// worst sample falls more than `drop_pct` points below baseline. The minimum,
// not the median, is used per voltage: one failed inference at a voltage is
// already the first sign of instability.

use crate::record::SweepRecord;
use serde::{Deserialize, Serialize};

/// Worst accuracy observed at one voltage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageLevel {
    /// Highest voltage in the bucket
    pub voltage_mv: f64,
    pub min_accuracy_pct: f64,
    pub sample_count: usize,
}

/// Outcome of the knee search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KneeDetection {
    pub knee_voltage_mv: f64,
    /// Accuracy below which a voltage counts as collapsed
    pub drop_threshold_pct: f64,
    /// False when no voltage fell below the threshold and the knee defaulted
    /// to the lowest tested voltage
    pub cliff_detected: bool,
}

/// Group samples by voltage, highest first
///
/// A new level starts whenever a voltage is more than `epsilon_mv` below the
/// first voltage of the current level.
pub fn voltage_levels(records: &[SweepRecord], epsilon_mv: f64) -> Vec<VoltageLevel> {
    let mut points: Vec<(f64, f64)> = records
        .iter()
        .map(|r| (r.voltage_mv, r.accuracy_pct))
        .collect();
    points.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut levels: Vec<VoltageLevel> = Vec::new();
    for (voltage, accuracy) in points {
        match levels.last_mut() {
            Some(level) if level.voltage_mv - voltage <= epsilon_mv => {
                level.min_accuracy_pct = level.min_accuracy_pct.min(accuracy);
                level.sample_count += 1;
            }
            _ => levels.push(VoltageLevel {
                voltage_mv: voltage,
                min_accuracy_pct: accuracy,
                sample_count: 1,
            }),
        }
    }

    levels
}

/// Find the highest voltage whose worst accuracy is below `baseline - drop_pct`
///
/// Returns `None` only for an empty slice. Without a collapse the knee is the
/// lowest tested voltage and `cliff_detected` is false.
pub fn detect_knee(
    records: &[SweepRecord],
    baseline_pct: f64,
    drop_pct: f64,
    epsilon_mv: f64,
) -> Option<KneeDetection> {
    let levels = voltage_levels(records, epsilon_mv);
    let lowest = levels.last()?.voltage_mv;
    let drop_threshold_pct = baseline_pct - drop_pct;

    let collapsed = levels
        .iter()
        .find(|level| level.min_accuracy_pct < drop_threshold_pct);

    let detection = match collapsed {
        Some(level) => KneeDetection {
            knee_voltage_mv: level.voltage_mv,
            drop_threshold_pct,
            cliff_detected: true,
        },
        None => {
            tracing::info!(
                "No accuracy drop below {:.2}% within tested range; knee defaults to {:.1} mV",
                drop_threshold_pct,
                lowest
            );
            KneeDetection {
                knee_voltage_mv: lowest,
                drop_threshold_pct,
                cliff_detected: false,
            }
        }
    };

    Some(detection)
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
    fn test_equal_to_threshold_is_not_a_drop() {
        let data = records(&[
            (900.0, 70.0),
            (800.0, 71.0),
            (700.0, 69.0),
            (600.0, 65.0),
            (500.0, 10.0),
        ]);
        let knee = detect_knee(&data, 70.0, 5.0, 0.0).unwrap();
        assert_eq!(knee.knee_voltage_mv, 500.0);
        assert_eq!(knee.drop_threshold_pct, 65.0);
        assert!(knee.cliff_detected);
    }

    #[test]
    fn test_single_failure_marks_knee() {
        // 600 mV has one good and one failed sample: the minimum catches it
        let data = records(&[
            (800.0, 70.0),
            (700.0, 70.0),
            (600.0, 70.0),
            (600.0, 12.0),
            (500.0, 5.0),
        ]);
        let knee = detect_knee(&data, 70.0, 5.0, 0.0).unwrap();
        assert_eq!(knee.knee_voltage_mv, 600.0);
    }

    #[test]
    fn test_acquisition_order_irrelevant() {
        let data = records(&[(500.0, 10.0), (900.0, 70.0), (600.0, 40.0), (700.0, 70.0)]);
        let knee = detect_knee(&data, 70.0, 5.0, 0.0).unwrap();
        assert_eq!(knee.knee_voltage_mv, 600.0);
    }

    #[test]
    fn test_no_cliff_defaults_to_lowest_voltage() {
        let data = records(&[(850.0, 70.0), (700.0, 69.0), (560.0, 68.0)]);
        let knee = detect_knee(&data, 70.0, 5.0, 0.0).unwrap();
        assert_eq!(knee.knee_voltage_mv, 560.0);
        assert!(!knee.cliff_detected);
    }

    #[test]
    fn test_empty_records() {
        assert!(detect_knee(&[], 70.0, 5.0, 0.0).is_none());
    }

    #[test]
    fn test_voltage_levels_exact_bucketing() {
        let data = records(&[(600.0, 70.0), (600.0, 60.0), (599.0, 50.0)]);
        let levels = voltage_levels(&data, 0.0);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].voltage_mv, 600.0);
        assert_eq!(levels[0].min_accuracy_pct, 60.0);
        assert_eq!(levels[0].sample_count, 2);
    }

    #[test]
    fn test_voltage_levels_epsilon_bucketing() {
        let data = records(&[(600.0, 70.0), (599.6, 50.0), (590.0, 40.0)]);
        let levels = voltage_levels(&data, 0.5);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].voltage_mv, 600.0);
        assert_eq!(levels[0].min_accuracy_pct, 50.0);
    }
}
