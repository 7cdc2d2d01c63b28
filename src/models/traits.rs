//! Forecaster trait and fitted-model summary.

use crate::core::TimeSeries;
use crate::error::Result;
use std::fmt;

/// Common interface for the autoregressive models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    ///
    /// The series must not contain missing values.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Point forecasts for the next `horizon` steps.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;

    /// In-sample one-step-ahead predictions on the original scale, `NaN`
    /// where the model has no prediction (differencing and lag warm-up).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// `actual - fitted`, `NaN` where fitted is undefined.
    fn residuals(&self) -> Option<&[f64]>;

    /// Estimated parameters and fit statistics.
    fn summary(&self) -> Option<ModelSummary>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster>;

/// Estimated parameters and goodness of fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    /// Model label, e.g. `ARIMA(1,1,1)`.
    pub model: String,
    /// Mean of the differenced series.
    pub intercept: f64,
    /// Non-seasonal AR coefficients.
    pub ar: Vec<f64>,
    /// Non-seasonal MA coefficients.
    pub ma: Vec<f64>,
    /// Seasonal AR coefficients.
    pub seasonal_ar: Vec<f64>,
    /// Seasonal MA coefficients.
    pub seasonal_ma: Vec<f64>,
    /// Innovation variance (CSS / effective observations).
    pub sigma2: f64,
    /// Conditional Gaussian log-likelihood.
    pub log_likelihood: f64,
    /// Akaike information criterion.
    pub aic: f64,
    /// Bayesian information criterion.
    pub bic: f64,
    /// Observations entering the sum of squares.
    pub nobs: usize,
    /// Optimiser iterations.
    pub iterations: usize,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.model)?;
        writeln!(f, "  intercept  {:>12.6}", self.intercept)?;
        let groups = [
            ("ar", &self.ar),
            ("ma", &self.ma),
            ("ar.S", &self.seasonal_ar),
            ("ma.S", &self.seasonal_ma),
        ];
        for (prefix, coefs) in groups {
            for (i, c) in coefs.iter().enumerate() {
                writeln!(f, "  {:<9}  {:>12.6}", format!("{}.L{}", prefix, i + 1), c)?;
            }
        }
        writeln!(f, "  sigma2     {:>12.6}", self.sigma2)?;
        write!(
            f,
            "  nobs {}  log-lik {:.3}  AIC {:.3}  BIC {:.3}",
            self.nobs, self.log_likelihood, self.aic, self.bic
        )
    }
}
