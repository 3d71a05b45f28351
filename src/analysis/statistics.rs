// Robust summary statistics for sweep samples
//
// Medians go through aprender's DescriptiveStats (R-7 quantile, QuickSelect)
// over a trueno Vector, the same path used for every other quantile in the
// crate. That path is f32, so the quantile is mapped back onto the original
// f64 samples: thresholds derived from a median must compare exactly against
// the readings they came from.

use anyhow::Result;
use aprender::stats::DescriptiveStats;
use trueno::Vector;

/// Median of a sample set, `None` when empty
///
/// Median rather than mean: a single corrupted accuracy reading or power spike
/// must not move the estimate. The result is always an input sample (odd
/// length) or the f64 mean of the two samples bracketing the middle (even
/// length).
pub fn median(values: &[f64]) -> Result<Option<f64>> {
    if values.is_empty() {
        return Ok(None);
    }

    let samples: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    let vector = Vector::from_slice(&samples);
    let stats = DescriptiveStats::new(&vector);
    let estimate = stats
        .quantile(0.5)
        .map_err(|e| anyhow::anyhow!("Failed to compute median: {}", e))?;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let exact = if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    };

    tracing::trace!(
        "Median {} (f32 quantile {}) over {} samples",
        exact,
        estimate,
        sorted.len()
    );
    Ok(Some(exact))
}

/// Smallest value, `None` when empty
pub fn min_value(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().reduce(f64::min)
}

/// Largest value, `None` when empty
pub fn max_value(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().reduce(f64::max)
}
