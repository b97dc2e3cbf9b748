//! Summary statistics on measurement series.
//!
//! Percentiles interpolate linearly between the two closest ranks, i.e., the `q`-quantile of a
//! sorted series `x` of length `n` is taken at position `(n - 1) * q`.

use statrs::statistics::Statistics;

/// Arithmetic mean, `None` for an empty series.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}

/// Sample standard deviation, `None` for less than two values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        None
    } else {
        Some(values.iter().std_dev())
    }
}

/// Quantile `q` (in `[0, 1]`) with linear interpolation. `None` for an empty series.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mean_of_series() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), Some(3.0));
    }

    #[test]
    fn std_dev_of_series() {
        assert_eq!(std_dev(&[4.0]), None);
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn quantile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(quantile(&values, 0.0), Some(10.0));
        assert_eq!(quantile(&values, 0.5), Some(30.0));
        assert_eq!(quantile(&values, 1.0), Some(50.0));
        // position 3.8 -> 40 + 0.8 * 10
        assert!((quantile(&values, 0.95).unwrap() - 48.0).abs() < 1e-9);
    }

    #[test]
    fn quantile_unsorted_and_single() {
        assert_eq!(quantile(&[], 0.95), None);
        assert_eq!(quantile(&[7.0], 0.95), Some(7.0));
        assert!((quantile(&[3.0, 1.0, 2.0], 0.25).unwrap() - 1.5).abs() < 1e-9);
    }
}
