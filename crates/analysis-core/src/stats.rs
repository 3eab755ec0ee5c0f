//! Small numeric helpers shared by the analytics crates.
//!
//! Empty or too-short inputs return 0.0 rather than NaN so callers can
//! decide on their own floors.

use statrs::statistics::Statistics;

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.mean()
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    data.std_dev()
}

/// Simple returns `p[t] / p[t-1] - 1`, skipping pairs with a zero base.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter_map(|w| {
            if w[0] != 0.0 {
                Some(w[1] / w[0] - 1.0)
            } else {
                None
            }
        })
        .collect()
}

/// Natural log returns `ln(p[t] / p[t-1])`. Non-finite values are kept so
/// callers can reject degenerate series.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// Percentage change from `from` to `to`, `None` when `from` is zero.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data) - 5.0).abs() < 1e-12);
        // sample variance = 32 / 7
        assert!((std_dev(&data) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[1.0]), 0.0);
    }

    #[test]
    fn test_simple_returns() {
        let r = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);

        let skipped = simple_returns(&[0.0, 5.0, 10.0]);
        assert_eq!(skipped.len(), 1);
        assert!((skipped[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_returns() {
        let r = log_returns(&[100.0, 110.0]);
        assert_eq!(r.len(), 1);
        assert!((r[0] - (1.1f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(0.0, 10.0), None);
        assert!((pct_change(100.0, 104.0).unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(round_to(1.23456, 2), 1.23);
    }
}
