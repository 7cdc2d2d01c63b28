//! Augmented Dickey-Fuller unit-root test.
//!
//! Regression with a constant only:
//! `Δy_t = α + β·y_{t-1} + Σ γ_i·Δy_{t-i} + ε_t`, lag order chosen by AIC
//! on a common sample, p-value from MacKinnon's (1994) response surface.

use crate::error::{ExplorerError, Result};
use crate::utils::ols::ols_fit;
use crate::utils::stats::normal_cdf;
use std::fmt;
use tracing::debug;

/// Significance level for the stationarity verdict.
pub const STATIONARITY_SIGNIFICANCE: f64 = 0.05;

/// Fewest observations the test accepts.
pub const ADF_MIN_OBSERVATIONS: usize = 6;

/// Outcome of comparing the p-value with [`STATIONARITY_SIGNIFICANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationarityVerdict {
    /// Unit root rejected.
    Stationary,
    /// Unit root not rejected.
    NonStationary,
}

impl StationarityVerdict {
    /// Verdict for a p-value: stationary iff `p < STATIONARITY_SIGNIFICANCE`.
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value < STATIONARITY_SIGNIFICANCE {
            Self::Stationary
        } else {
            Self::NonStationary
        }
    }
}

impl fmt::Display for StationarityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stationary => write!(f, "stationary"),
            Self::NonStationary => write!(f, "non-stationary"),
        }
    }
}

/// Critical values for the constant-only ADF regression.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

impl CriticalValues {
    /// MacKinnon (2010) finite-sample critical values for `nobs` observations.
    pub fn for_nobs(nobs: usize) -> Self {
        let surface = |b: [f64; 4]| {
            let inv = 1.0 / nobs.max(1) as f64;
            b[0] + b[1] * inv + b[2] * inv.powi(2) + b[3] * inv.powi(3)
        };
        Self {
            cv_1pct: surface([-3.43035, -6.5393, -16.786, -79.433]),
            cv_5pct: surface([-2.86154, -2.8903, -4.234, -40.040]),
            cv_10pct: surface([-2.56677, -1.5384, -2.809, 0.0]),
        }
    }
}

/// Result of the ADF test.
#[derive(Debug, Clone, PartialEq)]
pub struct StationarityResult {
    /// t-statistic of the lagged level coefficient.
    pub statistic: f64,
    /// MacKinnon approximate p-value in [0, 1].
    pub p_value: f64,
    /// Number of lagged differences used.
    pub lags: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    /// Critical values at common significance levels.
    pub critical_values: CriticalValues,
    /// Verdict at [`STATIONARITY_SIGNIFICANCE`].
    pub verdict: StationarityVerdict,
}

impl StationarityResult {
    /// True when the unit root is rejected.
    pub fn is_stationary(&self) -> bool {
        self.verdict == StationarityVerdict::Stationary
    }
}

/// Run the ADF test on a series without missing values.
///
/// `max_lags` caps the lagged differences tried; `None` uses
/// `⌈12·(n/100)^¼⌉`. Either way the cap never exceeds `n/2 - 2`.
///
/// A constant series has no unit root to speak of: it yields a statistic
/// of `-∞` and a p-value of `0.0` rather than an error.
///
/// # Example
/// ```
/// use ts_explorer::diagnostics::{adf_test, StationarityVerdict};
///
/// let alternating: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
/// let result = adf_test(&alternating, None).unwrap();
/// assert!((0.0..=1.0).contains(&result.p_value));
/// ```
pub fn adf_test(series: &[f64], max_lags: Option<usize>) -> Result<StationarityResult> {
    let n = series.len();
    if n < ADF_MIN_OBSERVATIONS {
        return Err(ExplorerError::InsufficientData {
            needed: ADF_MIN_OBSERVATIONS,
            got: n,
        });
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(ExplorerError::InvalidParameter(
            "ADF input must not contain missing values".to_string(),
        ));
    }

    let default_lags = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lags = max_lags.unwrap_or(default_lags).min(n / 2 - 2);

    if is_constant(series) {
        let nobs = n - 1 - max_lags;
        debug!(n, "constant series, unit root trivially rejected");
        return Ok(StationarityResult {
            statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            lags: max_lags,
            nobs,
            critical_values: CriticalValues::for_nobs(nobs),
            verdict: StationarityVerdict::Stationary,
        });
    }

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // Common sample for every candidate order
    let mut best_lag = 0;
    let mut best_aic = f64::INFINITY;
    for lag in 0..=max_lags {
        if let Ok(fit) = adf_regression(series, &diff, lag, max_lags) {
            let aic = fit.aic();
            if aic < best_aic {
                best_aic = aic;
                best_lag = lag;
            }
        }
    }

    let fit = adf_regression(series, &diff, best_lag, best_lag)?;
    let statistic = fit.t_stat(1);
    let p_value = mackinnon_p_value(statistic);

    debug!(
        lags = best_lag,
        nobs = fit.nobs,
        statistic,
        p_value,
        "ADF test"
    );

    Ok(StationarityResult {
        statistic,
        p_value,
        lags: best_lag,
        nobs: fit.nobs,
        critical_values: CriticalValues::for_nobs(fit.nobs),
        verdict: StationarityVerdict::from_p_value(p_value),
    })
}

/// Fit the ADF regression with `lag` lagged differences, starting the sample
/// at difference index `start` (`start >= lag`).
fn adf_regression(
    levels: &[f64],
    diff: &[f64],
    lag: usize,
    start: usize,
) -> Result<crate::utils::OLSResult> {
    let rows = start..diff.len();
    let response: Vec<f64> = rows.clone().map(|t| diff[t]).collect();

    let mut columns = Vec::with_capacity(lag + 2);
    columns.push(vec![1.0; response.len()]);
    columns.push(rows.clone().map(|t| levels[t]).collect());
    for i in 1..=lag {
        columns.push(rows.clone().map(|t| diff[t - i]).collect());
    }

    ols_fit(&response, &columns)
}

fn is_constant(series: &[f64]) -> bool {
    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let scale = min.abs().max(max.abs()).max(1.0);
    max - min <= 1e-12 * scale
}

/// MacKinnon (1994) approximate p-value for the constant-only, single
/// series case.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic.is_nan() {
        return 1.0;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let coefs: &[f64] = if statistic <= TAU_STAR {
        &SMALL_P
    } else {
        &LARGE_P
    };
    let z = coefs.iter().rev().fold(0.0, |acc, c| acc * statistic + c);
    normal_cdf(z).clamp(0.0, 1.0)
}
