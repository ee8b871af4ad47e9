//! Small order statistics used by the robust estimators.

use std::cmp::Ordering;

/// Median of `values`, sorting in place. `None` for an empty slice.
///
/// Even-length input averages the two central elements.
pub fn median_mut(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Mean of `|v|`; 0 for empty input.
pub fn mean_abs(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v.abs(), n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}
