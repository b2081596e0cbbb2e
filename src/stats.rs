//! Small descriptive statistics helpers

use std::cmp::Ordering;

/// Sort a slice of floats in place (NaN-tolerant)
pub fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

/// Percentile of sorted values with linear interpolation between closest ranks.
///
/// `pct` is in `[0, 100]`. Returns 0.0 for an empty slice.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let weight = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 25.0) - 1.75).abs() < 1e-12);
        assert!((percentile(&values, 75.0) - 3.25).abs() < 1e-12);
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_bounds() {
        let values = [5.0, 10.0];
        assert_eq!(percentile(&values, 0.0), 5.0);
        assert_eq!(percentile(&values, 100.0), 10.0);
        assert_eq!(percentile(&[7.0], 25.0), 7.0);
        assert_eq!(percentile(&[], 25.0), 0.0);
    }

    #[test]
    fn test_sort_values_then_median() {
        let mut values = [4.0, 1.0, 3.0, 2.0];
        sort_values(&mut values);
        assert_eq!(values, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(percentile(&values, 50.0), 2.5);
    }
}
