//! Multiplicative seasonal ARIMA.

use crate::core::TimeSeries;
use crate::error::{ExplorerError, Result};
use crate::models::arima::css::{fit_css, ArmaFit};
use crate::models::arima::diff::{difference, differencing_polynomial, seasonal_difference};
use crate::models::{Forecaster, ModelSummary};

/// SARIMA(p, d, q)(P, D, Q)\[s\] forecasting model.
///
/// The series is differenced `d` times, then seasonally `D` times at lag
/// `s`. The ARMA part is the product `φ(B)Φ(B^s)` / `θ(B)Θ(B^s)`, expanded
/// to plain lag polynomials and estimated by conditional sum of squares.
#[derive(Debug, Clone)]
pub struct SARIMA {
    p: usize,
    d: usize,
    q: usize,
    seasonal_p: usize,
    seasonal_d: usize,
    seasonal_q: usize,
    period: usize,
    label: String,
    fit: Option<ArmaFit>,
}

impl SARIMA {
    /// Create a SARIMA model from its non-seasonal and seasonal orders.
    pub fn new(
        (p, d, q): (usize, usize, usize),
        (seasonal_p, seasonal_d, seasonal_q): (usize, usize, usize),
        period: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
            label: format!(
                "SARIMA({},{},{})({},{},{})[{}]",
                p, d, q, seasonal_p, seasonal_d, seasonal_q, period
            ),
            fit: None,
        }
    }

    /// Seasonal period.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Parameter slices in model order: φ, θ, Φ, Θ.
    fn split<'a>(&self, params: &'a [f64]) -> [&'a [f64]; 4] {
        let (ar, rest) = params.split_at(self.p);
        let (ma, rest) = rest.split_at(self.q);
        let (sar, sma) = rest.split_at(self.seasonal_p);
        [ar, ma, sar, sma]
    }

    fn coefficients(&self, which: usize) -> Vec<f64> {
        match &self.fit {
            Some(f) => self.split(&f.params)[which].to_vec(),
            None => vec![],
        }
    }
}

/// Expand `φ(B)Φ(B^s)` into predictor weights: `a_i += φ_i`,
/// `a_{js} += Φ_j`, `a_{i+js} -= φ_iΦ_j`.
pub(crate) fn expand_ar(ar: &[f64], seasonal_ar: &[f64], period: usize) -> Vec<f64> {
    let len = ar.len() + seasonal_ar.len() * period;
    let mut out = vec![0.0; len];
    for (i, phi) in ar.iter().enumerate() {
        out[i] += phi;
    }
    for (j, big_phi) in seasonal_ar.iter().enumerate() {
        let lag = (j + 1) * period;
        out[lag - 1] += big_phi;
        for (i, phi) in ar.iter().enumerate() {
            out[lag + i] -= phi * big_phi;
        }
    }
    out
}

/// Expand `θ(B)Θ(B^s)`: every term enters with a positive sign.
pub(crate) fn expand_ma(ma: &[f64], seasonal_ma: &[f64], period: usize) -> Vec<f64> {
    let len = ma.len() + seasonal_ma.len() * period;
    let mut out = vec![0.0; len];
    for (i, theta) in ma.iter().enumerate() {
        out[i] += theta;
    }
    for (j, big_theta) in seasonal_ma.iter().enumerate() {
        let lag = (j + 1) * period;
        out[lag - 1] += big_theta;
        for (i, theta) in ma.iter().enumerate() {
            out[lag + i] += theta * big_theta;
        }
    }
    out
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.fit = None;
        if self.period < 2 {
            return Err(ExplorerError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                self.period
            )));
        }
        if series.has_missing_values() {
            return Err(ExplorerError::InvalidParameter(format!(
                "{} input must not contain missing values",
                self.label
            )));
        }

        let values = series.values();
        let differenced = seasonal_difference(
            &difference(values, self.d),
            self.seasonal_d,
            self.period,
        );

        let initial: Vec<f64> = [self.p, self.q, self.seasonal_p, self.seasonal_q]
            .iter()
            .flat_map(|&order| (0..order).map(|i| 0.1 / (i + 1) as f64))
            .collect();

        let period = self.period;
        let fit = fit_css(
            &self.label,
            values,
            differenced,
            differencing_polynomial(self.d, self.seasonal_d, period),
            initial,
            |params| {
                let [ar, ma, sar, sma] = self.split(params);
                (expand_ar(ar, sar, period), expand_ma(ma, sma, period))
            },
        )?;

        self.fit = Some(fit);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let fit = self.fit.as_ref().ok_or(ExplorerError::NotFitted)?;
        Ok(fit.forecast(horizon))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.residuals.as_slice())
    }

    fn summary(&self) -> Option<ModelSummary> {
        let fit = self.fit.as_ref()?;
        Some(ModelSummary {
            model: self.label.clone(),
            intercept: fit.intercept,
            ar: self.coefficients(0),
            ma: self.coefficients(1),
            seasonal_ar: self.coefficients(2),
            seasonal_ma: self.coefficients(3),
            sigma2: fit.sigma2,
            log_likelihood: fit.log_likelihood,
            aic: fit.aic,
            bic: fit.bic,
            nobs: fit.nobs,
            iterations: fit.iterations,
        })
    }

    fn name(&self) -> &str {
        "SARIMA"
    }
}
