//! Seasonal decomposition of a time series.
//!
//! - STL: Seasonal-Trend decomposition using LOESS (default)
//! - Classical: centred moving-average decomposition

mod classical;
mod stl;

pub use classical::{classical_decompose, ClassicalResult};
pub use stl::{STLResult, STL};

use crate::core::{interpolate_series, TimeSeries};
use crate::error::{ExplorerError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, warn};

/// Smallest accepted seasonal period.
pub const MIN_PERIOD: usize = 2;

/// Default seasonal period (monthly data).
pub const DEFAULT_PERIOD: usize = 12;

/// Decomposition algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecompositionMethod {
    /// LOESS-based STL.
    #[default]
    Stl,
    /// Centred moving average.
    Classical,
}

impl fmt::Display for DecompositionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stl => write!(f, "STL"),
            Self::Classical => write!(f, "classical"),
        }
    }
}

/// Decomposition settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompositionConfig {
    /// Seasonal period in observations.
    pub period: usize,
    /// Algorithm.
    pub method: DecompositionMethod,
    /// Robustness iterations for STL; ignored by the classical method.
    pub robust: bool,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            method: DecompositionMethod::Stl,
            robust: false,
        }
    }
}

impl DecompositionConfig {
    /// Default settings with the given period.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// Set the seasonal period.
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    /// Set the algorithm.
    pub fn with_method(mut self, method: DecompositionMethod) -> Self {
        self.method = method;
        self
    }

    /// Enable or disable robust STL.
    pub fn with_robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    /// Check the period bound.
    pub fn validate(&self) -> Result<()> {
        if self.period < MIN_PERIOD {
            return Err(ExplorerError::InvalidParameter(format!(
                "seasonal period must be at least {}, got {}",
                MIN_PERIOD, self.period
            )));
        }
        Ok(())
    }
}

/// Additive decomposition aligned index-for-index with the input series.
///
/// Missing entries are `NaN`. Wherever all four are defined,
/// `trend + seasonal + residual == observed`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionResult {
    /// Timestamps of the input series.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Input values, `NaN` where missing.
    pub observed: Vec<f64>,
    /// Trend component.
    pub trend: Vec<f64>,
    /// Seasonal component.
    pub seasonal: Vec<f64>,
    /// Residual component.
    pub residual: Vec<f64>,
    /// Period used.
    pub period: usize,
    /// Algorithm used.
    pub method: DecompositionMethod,
}

impl DecompositionResult {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// True for an empty decomposition.
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// `max(0, 1 - Var(R) / Var(S + R))` over defined points.
    pub fn seasonal_strength(&self) -> f64 {
        stl::strength(&self.seasonal, &self.residual)
    }

    /// `max(0, 1 - Var(R) / Var(T + R))` over defined points.
    pub fn trend_strength(&self) -> f64 {
        stl::strength(&self.trend, &self.residual)
    }
}

/// Decompose `series` into trend, seasonal and residual components.
///
/// Interior gaps are linearly interpolated (edges carried) for the fit, and
/// the residual at an originally missing index is `NaN`.
///
/// # Errors
/// `InvalidParameter` for a period below 2; `InsufficientData` when fewer
/// than `2 × period` values are observed.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use ts_explorer::core::TimeSeries;
/// use ts_explorer::seasonality::{decompose, DecompositionConfig};
///
/// let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// let timestamps = (0..48).map(|i| start + Duration::days(i)).collect();
/// let values = (0..48).map(|i| (i % 12) as f64).collect();
/// let series = TimeSeries::new(timestamps, values).unwrap();
///
/// let result = decompose(&series, &DecompositionConfig::new(12)).unwrap();
/// assert_eq!(result.trend.len(), 48);
/// ```
pub fn decompose(series: &TimeSeries, config: &DecompositionConfig) -> Result<DecompositionResult> {
    config.validate()?;
    let period = config.period;

    let observed = series.values().to_vec();
    let present = observed.len() - series.missing_count();
    if present < 2 * period {
        return Err(ExplorerError::InsufficientData {
            needed: 2 * period,
            got: present,
        });
    }

    let missing = series.missing_count();
    let filled = if missing > 0 {
        warn!(missing, "interpolating gaps before decomposition");
        interpolate_series(&observed, true)
    } else {
        observed.clone()
    };

    let (trend, seasonal, mut residual) = match config.method {
        DecompositionMethod::Stl => {
            let mut stl = STL::new(period);
            if config.robust {
                stl = stl.robust();
            }
            let r = stl.decompose(&filled)?;
            (r.trend, r.seasonal, r.remainder)
        }
        DecompositionMethod::Classical => {
            let r = classical_decompose(&filled, period)?;
            (r.trend, r.seasonal, r.remainder)
        }
    };

    for (res, obs) in residual.iter_mut().zip(&observed) {
        if !obs.is_finite() {
            *res = f64::NAN;
        }
    }

    debug!(
        method = %config.method,
        period,
        robust = config.robust,
        n = observed.len(),
        missing,
        "decomposed series"
    );

    Ok(DecompositionResult {
        timestamps: series.timestamps().to_vec(),
        observed,
        trend,
        seasonal,
        residual,
        period,
        method: config.method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Months, TimeZone};

    fn monthly(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..values.len())
            .map(|i| start + Months::new(i as u32))
            .collect();
        TimeSeries::new(timestamps, values).unwrap()
    }

    fn seasonal_values(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 0.5 * i as f64 + 8.0 * (std::f64::consts::TAU * i as f64 / 12.0).sin())
            .collect()
    }

    #[test]
    fn components_match_input_length() {
        let result = decompose(&monthly(seasonal_values(36)), &DecompositionConfig::new(12)).unwrap();
        assert_eq!(result.len(), 36);
        assert_eq!(result.trend.len(), 36);
        assert_eq!(result.seasonal.len(), 36);
        assert_eq!(result.residual.len(), 36);
        assert_eq!(result.method, DecompositionMethod::Stl);
    }

    #[test]
    fn components_are_additive() {
        for method in [DecompositionMethod::Stl, DecompositionMethod::Classical] {
            let config = DecompositionConfig::new(12).with_method(method);
            let result = decompose(&monthly(seasonal_values(60)), &config).unwrap();
            for i in 0..result.len() {
                if result.trend[i].is_finite() && result.residual[i].is_finite() {
                    assert_relative_eq!(
                        result.trend[i] + result.seasonal[i] + result.residual[i],
                        result.observed[i],
                        epsilon = 1e-9
                    );
                }
            }
        }
    }

    #[test]
    fn short_series_is_insufficient() {
        assert_eq!(
            decompose(&monthly(seasonal_values(10)), &DecompositionConfig::new(12)).unwrap_err(),
            ExplorerError::InsufficientData { needed: 24, got: 10 }
        );
    }

    #[test]
    fn degenerate_period_is_invalid() {
        assert!(matches!(
            decompose(&monthly(seasonal_values(36)), &DecompositionConfig::new(1)),
            Err(ExplorerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn missing_points_keep_nan_residual() {
        let mut values = seasonal_values(48);
        values[5] = f64::NAN;
        values[30] = f64::NAN;

        let result = decompose(&monthly(values), &DecompositionConfig::new(12)).unwrap();
        assert!(result.observed[5].is_nan());
        assert!(result.residual[5].is_nan());
        assert!(result.residual[30].is_nan());
        assert!(result.trend[5].is_finite());
        assert!(result.residual[6].is_finite());
    }

    #[test]
    fn robust_and_classical_options_are_honoured() {
        let config = DecompositionConfig::default()
            .with_period(12)
            .with_robust(true);
        assert!(decompose(&monthly(seasonal_values(48)), &config).is_ok());

        let config = config.with_method(DecompositionMethod::Classical);
        let result = decompose(&monthly(seasonal_values(48)), &config).unwrap();
        assert!(result.trend[0].is_nan());
        assert_eq!(result.method.to_string(), "classical");
    }

    #[test]
    fn strong_seasonality_is_reported() {
        let result = decompose(&monthly(seasonal_values(72)), &DecompositionConfig::new(12)).unwrap();
        assert!(result.seasonal_strength() > 0.5);
        assert!(result.trend_strength() > 0.5);
    }
}
