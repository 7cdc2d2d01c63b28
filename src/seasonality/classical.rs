//! Classical additive decomposition by centred moving average.

use crate::error::{ExplorerError, Result};

/// Components from [`classical_decompose`].
///
/// Trend and remainder are `NaN` for the first and last `period / 2` points,
/// where the centred window does not fit.
#[derive(Debug, Clone)]
pub struct ClassicalResult {
    /// Centred moving-average trend.
    pub trend: Vec<f64>,
    /// Mean-zero seasonal pattern tiled over the series.
    pub seasonal: Vec<f64>,
    /// `series - trend - seasonal`.
    pub remainder: Vec<f64>,
}

/// Additive classical decomposition of a series without missing values.
pub fn classical_decompose(series: &[f64], period: usize) -> Result<ClassicalResult> {
    if period < 2 {
        return Err(ExplorerError::InvalidParameter(format!(
            "seasonal period must be at least 2, got {}",
            period
        )));
    }
    let n = series.len();
    if n < 2 * period {
        return Err(ExplorerError::InsufficientData {
            needed: 2 * period,
            got: n,
        });
    }

    let trend = centred_moving_average(series, period);

    // Average detrended value per seasonal position
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (y, t)) in series.iter().zip(&trend).enumerate() {
        if t.is_finite() {
            sums[i % period] += y - t;
            counts[i % period] += 1;
        }
    }
    let mut pattern: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();
    let level = pattern.iter().sum::<f64>() / period as f64;
    pattern.iter_mut().for_each(|p| *p -= level);

    let seasonal: Vec<f64> = (0..n).map(|i| pattern[i % period]).collect();
    let remainder = series
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((y, t), s)| y - t - s)
        .collect();

    Ok(ClassicalResult {
        trend,
        seasonal,
        remainder,
    })
}

/// Centred moving average; even periods use the 2×m filter with half
/// weights at both ends.
fn centred_moving_average(series: &[f64], period: usize) -> Vec<f64> {
    let n = series.len();
    let half = period / 2;
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] /= 2.0;
        w[period] /= 2.0;
        w
    } else {
        vec![1.0 / period as f64; period]
    };

    let mut trend = vec![f64::NAN; n];
    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        *slot = weights
            .iter()
            .enumerate()
            .map(|(k, w)| w * series[i - half + k])
            .sum();
    }
    trend
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn edges_are_undefined() {
        let series: Vec<f64> = (0..36).map(|i| i as f64 + (i % 12) as f64).collect();
        let result = classical_decompose(&series, 12).unwrap();

        assert!(result.trend[..6].iter().all(|v| v.is_nan()));
        assert!(result.trend[30..].iter().all(|v| v.is_nan()));
        assert!(result.trend[6..30].iter().all(|v| v.is_finite()));
        assert!(result.remainder[..6].iter().all(|v| v.is_nan()));
        assert!(result.seasonal.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn linear_trend_is_recovered_exactly() {
        let pattern = [3.0, -1.0, -2.0, 0.0];
        let series: Vec<f64> = (0..40).map(|i| 0.5 * i as f64 + pattern[i % 4]).collect();
        let result = classical_decompose(&series, 4).unwrap();

        for i in 2..38 {
            assert_relative_eq!(result.trend[i], 0.5 * i as f64, epsilon = 1e-10);
            assert_relative_eq!(result.seasonal[i], pattern[i % 4], epsilon = 1e-10);
            assert_relative_eq!(result.remainder[i], 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn odd_period_uses_plain_average() {
        let series: Vec<f64> = (0..21).map(|i| [1.0, 2.0, 6.0][i % 3]).collect();
        let result = classical_decompose(&series, 3).unwrap();
        assert!(result.trend[0].is_nan());
        assert_relative_eq!(result.trend[1], 3.0, epsilon = 1e-12);
        assert!(result.trend[20].is_nan());
    }

    #[test]
    fn seasonal_pattern_sums_to_zero() {
        let series: Vec<f64> = (0..48).map(|i| ((i * 5) % 7) as f64).collect();
        let result = classical_decompose(&series, 12).unwrap();
        let cycle: f64 = result.seasonal[..12].iter().sum();
        assert_relative_eq!(cycle, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn too_short_is_insufficient() {
        assert_eq!(
            classical_decompose(&[1.0; 7], 4).unwrap_err(),
            ExplorerError::InsufficientData { needed: 8, got: 7 }
        );
    }
}
