//! Stationarity and autocorrelation diagnostics.

mod autocorrelation;
mod stationarity;

pub use autocorrelation::{correlogram, Correlogram};
pub use stationarity::{
    adf_test, mackinnon_p_value, CriticalValues, StationarityResult, StationarityVerdict,
    ADF_MIN_OBSERVATIONS, STATIONARITY_SIGNIFICANCE,
};

use crate::core::TimeSeries;
use crate::error::Result;
use tracing::debug;

/// ADF test plus correlogram for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsResult {
    /// Augmented Dickey-Fuller outcome.
    pub stationarity: StationarityResult,
    /// ACF and PACF up to the requested lag.
    pub correlogram: Correlogram,
}

/// Run both diagnostics on the observed (non-missing) values of `series`.
pub fn run_diagnostics(series: &TimeSeries, max_lag: usize) -> Result<DiagnosticsResult> {
    let observed = series.without_missing();
    let values = observed.values();

    let stationarity = adf_test(values, None)?;
    let correlogram = correlogram(values, max_lag)?;

    debug!(
        nobs = values.len(),
        dropped = series.missing_count(),
        max_lag,
        verdict = %stationarity.verdict,
        "diagnostics complete"
    );

    Ok(DiagnosticsResult {
        stationarity,
        correlogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..values.len()).map(|i| start + Duration::days(i as i64)).collect();
        TimeSeries::new(timestamps, values).unwrap()
    }

    #[test]
    fn missing_values_are_dropped_first() {
        let mut values: Vec<f64> = (0..60).map(|i| ((i * 7) % 11) as f64).collect();
        values[10] = f64::NAN;
        values[20] = f64::NAN;

        let result = run_diagnostics(&series(values), 20).unwrap();
        assert_eq!(result.correlogram.nobs, 58);
        assert_eq!(result.correlogram.acf.len(), 21);
    }

    #[test]
    fn lag_bound_counts_observed_values_only() {
        let mut values: Vec<f64> = (0..12).map(|i| (i % 3) as f64).collect();
        values[0] = f64::NAN;
        assert_eq!(
            run_diagnostics(&series(values), 11).unwrap_err(),
            ExplorerError::InsufficientData { needed: 12, got: 11 }
        );
    }

    #[test]
    fn constant_series_completes() {
        let result = run_diagnostics(&series(vec![2.5; 50]), 10).unwrap();
        assert_eq!(result.stationarity.p_value, 0.0);
        assert_eq!(result.correlogram.acf[0], 1.0);
        assert!(result.correlogram.acf[1].is_nan());
    }
}
