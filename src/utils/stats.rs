//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(x),
        Err(_) => f64::NAN,
    }
}

/// Standard normal quantile (inverse CDF).
///
/// # Example
/// ```
/// use ts_explorer::utils::quantile_normal;
///
/// // 95% two-sided -> z ≈ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the median of a slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Biased sample autocovariances for lags `0..=max_lag` (denominator `n`).
///
/// Lags at or beyond the series length are zero.
pub fn autocovariances(values: &[f64], max_lag: usize) -> Vec<f64> {
    let n = values.len();
    let m = mean(values);
    (0..=max_lag)
        .map(|lag| {
            if lag >= n {
                return 0.0;
            }
            let sum: f64 = (lag..n).map(|t| (values[t] - m) * (values[t - lag] - m)).sum();
            sum / n as f64
        })
        .collect()
}
