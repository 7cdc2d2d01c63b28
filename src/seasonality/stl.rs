//! STL (Seasonal-Trend decomposition using LOESS).
//!
//! Splits a series into trend, seasonal and remainder such that
//! `trend + seasonal + remainder == series` exactly at every index.

use crate::error::{ExplorerError, Result};
use crate::utils::stats::variance;

/// Components produced by [`STL::decompose`].
#[derive(Debug, Clone)]
pub struct STLResult {
    /// Trend component.
    pub trend: Vec<f64>,
    /// Seasonal component.
    pub seasonal: Vec<f64>,
    /// Remainder component.
    pub remainder: Vec<f64>,
}

/// STL decomposition configuration and algorithm.
#[derive(Debug, Clone)]
pub struct STL {
    seasonal_period: usize,
    /// Seasonal LOESS span (ns), always odd.
    seasonal_smoothness: usize,
    /// Trend LOESS span (nt), always odd.
    trend_smoothness: usize,
    /// Low-pass LOESS span (nl), always odd.
    low_pass_smoothness: usize,
    inner_iterations: usize,
    outer_iterations: usize,
}

impl STL {
    /// Create a new STL decomposer with the given seasonal period.
    ///
    /// Spans follow Cleveland et al. (1990).
    pub fn new(seasonal_period: usize) -> Self {
        let period = seasonal_period.max(2) as f64;
        let nt = (1.5 * period / (1.0 - 1.5 / (period + 1.0))).ceil() as usize;

        Self {
            seasonal_period,
            seasonal_smoothness: odd(seasonal_period),
            trend_smoothness: odd(nt),
            low_pass_smoothness: odd(seasonal_period),
            inner_iterations: 2,
            outer_iterations: 0,
        }
    }

    /// Set custom seasonal smoothness (ns parameter).
    pub fn with_seasonal_smoothness(mut self, ns: usize) -> Self {
        self.seasonal_smoothness = odd(ns);
        self
    }

    /// Set custom trend smoothness (nt parameter).
    pub fn with_trend_smoothness(mut self, nt: usize) -> Self {
        self.trend_smoothness = odd(nt);
        self
    }

    /// Enable robust fitting with the default six outer iterations.
    pub fn robust(self) -> Self {
        self.with_outer_iterations(6)
    }

    /// Set number of outer (robustness) iterations; zero disables robustness.
    pub fn with_outer_iterations(mut self, n: usize) -> Self {
        self.outer_iterations = n;
        self
    }

    /// Set number of inner iterations.
    pub fn with_inner_iterations(mut self, n: usize) -> Self {
        self.inner_iterations = n.max(1);
        self
    }

    /// Seasonal period.
    pub fn period(&self) -> usize {
        self.seasonal_period
    }

    /// Whether robustness weighting is enabled.
    pub fn is_robust(&self) -> bool {
        self.outer_iterations > 0
    }

    /// Decompose a series without missing values.
    pub fn decompose(&self, series: &[f64]) -> Result<STLResult> {
        let period = self.seasonal_period;
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
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ExplorerError::InvalidParameter(
                "STL input must not contain missing values".to_string(),
            ));
        }

        let mut seasonal = vec![0.0; n];
        let mut trend = vec![0.0; n];
        let mut weights = vec![1.0; n];

        for outer in 0..=self.outer_iterations {
            if outer > 0 {
                let remainder = remainder_of(series, &seasonal, &trend);
                weights = robustness_weights(&remainder);
            }

            for _ in 0..self.inner_iterations {
                // Detrend, then smooth each cycle-subseries
                let detrended: Vec<f64> =
                    series.iter().zip(trend.iter()).map(|(y, t)| y - t).collect();
                let cycle = self.smooth_cycle_subseries(&detrended, &weights);

                // Remove the low-frequency part leaking into the cycle
                let low_pass = self.low_pass_filter(&cycle);
                for i in 0..n {
                    seasonal[i] = cycle[i] - low_pass[i];
                }

                let deseasonalized: Vec<f64> = series
                    .iter()
                    .zip(seasonal.iter())
                    .map(|(y, s)| y - s)
                    .collect();
                trend = tricube_smooth(&deseasonalized, self.trend_smoothness, &weights);
            }
        }

        let remainder = remainder_of(series, &seasonal, &trend);

        Ok(STLResult {
            trend,
            seasonal,
            remainder,
        })
    }

    /// Smooth each cycle-subseries (all values at the same seasonal position).
    fn smooth_cycle_subseries(&self, detrended: &[f64], weights: &[f64]) -> Vec<f64> {
        let n = detrended.len();
        let period = self.seasonal_period;
        let mut result = vec![0.0; n];

        for cycle_pos in 0..period {
            let indices: Vec<usize> = (cycle_pos..n).step_by(period).collect();
            let values: Vec<f64> = indices.iter().map(|&i| detrended[i]).collect();
            let sub_weights: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();

            let smoothed = tricube_smooth(&values, self.seasonal_smoothness, &sub_weights);
            for (&idx, value) in indices.iter().zip(smoothed) {
                result[idx] = value;
            }
        }

        result
    }

    /// Low-pass filter: MA(period), MA(period), MA(3), then LOESS.
    fn low_pass_filter(&self, series: &[f64]) -> Vec<f64> {
        let period = self.seasonal_period;
        let ma = moving_average(series, period);
        let ma = moving_average(&ma, period);
        let ma = moving_average(&ma, 3);
        tricube_smooth(&ma, self.low_pass_smoothness, &vec![1.0; series.len()])
    }
}

impl Default for STL {
    fn default() -> Self {
        Self::new(12)
    }
}

impl STLResult {
    /// Seasonal strength in [0, 1]; values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        strength(&self.seasonal, &self.remainder)
    }

    /// Trend strength in [0, 1]; values close to 1 indicate strong trend.
    pub fn trend_strength(&self) -> f64 {
        strength(&self.trend, &self.remainder)
    }
}

/// `1 - Var(R) / Var(C + R)`, clamped to [0, 1].
pub(crate) fn strength(component: &[f64], remainder: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = component
        .iter()
        .zip(remainder.iter())
        .filter(|(c, r)| c.is_finite() && r.is_finite())
        .map(|(c, r)| (*c, *r))
        .collect();
    let rem: Vec<f64> = pairs.iter().map(|(_, r)| *r).collect();
    let combined: Vec<f64> = pairs.iter().map(|(c, r)| c + r).collect();

    let var_combined = variance(&combined);
    if !var_combined.is_finite() || var_combined < 1e-10 {
        return 0.0;
    }

    (1.0 - variance(&rem) / var_combined).clamp(0.0, 1.0)
}

fn odd(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

fn remainder_of(series: &[f64], seasonal: &[f64], trend: &[f64]) -> Vec<f64> {
    series
        .iter()
        .zip(seasonal.iter())
        .zip(trend.iter())
        .map(|((y, s), t)| y - s - t)
        .collect()
}

/// Weighted tricube kernel smoother over a window of `span` points.
fn tricube_smooth(values: &[f64], span: usize, weights: &[f64]) -> Vec<f64> {
    let n = values.len();
    let half_span = span / 2;
    let max_dist = half_span as f64 + 1.0;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half_span);
            let end = (i + half_span + 1).min(n);

            let mut sum_weights = 0.0;
            let mut sum_values = 0.0;
            for j in start..end {
                let u = (i as f64 - j as f64).abs() / max_dist;
                let w = (1.0 - u.powi(3)).powi(3) * weights[j];
                sum_weights += w;
                sum_values += w * values[j];
            }

            if sum_weights > 0.0 {
                sum_values / sum_weights
            } else {
                values[i]
            }
        })
        .collect()
}

/// Centered moving average, shrinking the window at the edges.
fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let n = series.len();
    let half = window / 2;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            series[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

/// Bisquare weights from the remainder, scaled by six median absolute values.
fn robustness_weights(remainder: &[f64]) -> Vec<f64> {
    let abs: Vec<f64> = remainder.iter().map(|r| r.abs()).collect();
    let h = 6.0 * crate::utils::stats::median(&abs);

    remainder
        .iter()
        .map(|r| {
            if !(h > 1e-10) {
                return 1.0;
            }
            let u = r.abs() / h;
            if u < 1.0 {
                (1.0 - u * u).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}
