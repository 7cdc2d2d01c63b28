//! ARIMA (Autoregressive Integrated Moving Average) model.

use crate::core::TimeSeries;
use crate::error::{ExplorerError, Result};
use crate::models::arima::css::{fit_css, ArmaFit};
use crate::models::arima::diff::{difference, differencing_polynomial};
use crate::models::{Forecaster, ModelSummary};

/// ARIMA forecasting model.
///
/// ARIMA(p, d, q) combines:
/// - AR(p): Autoregressive component
/// - I(d): Differencing for stationarity
/// - MA(q): Moving average component
///
/// Parameters are estimated by conditional sum of squares with every
/// coefficient bounded to `(-0.99, 0.99)`.
#[derive(Debug, Clone)]
pub struct ARIMA {
    p: usize,
    d: usize,
    q: usize,
    label: String,
    fit: Option<ArmaFit>,
}

impl ARIMA {
    /// Create a new ARIMA model.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            label: format!("ARIMA({},{},{})", p, d, q),
            fit: None,
        }
    }

    /// `(p, d, q)`.
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Get AR coefficients.
    pub fn ar_coefficients(&self) -> &[f64] {
        match &self.fit {
            Some(f) => &f.params[..self.p],
            None => &[],
        }
    }

    /// Get MA coefficients.
    pub fn ma_coefficients(&self) -> &[f64] {
        match &self.fit {
            Some(f) => &f.params[self.p..],
            None => &[],
        }
    }

    /// Mean of the differenced series.
    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }

    /// Get AIC.
    pub fn aic(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.aic)
    }

    /// Get BIC.
    pub fn bic(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.bic)
    }
}

impl Default for ARIMA {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl Forecaster for ARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.fit = None;
        let values = series.values();
        if series.has_missing_values() {
            return Err(ExplorerError::InvalidParameter(format!(
                "{} input must not contain missing values",
                self.label
            )));
        }

        let (p, q) = (self.p, self.q);
        let initial: Vec<f64> = (0..p)
            .map(|i| 0.1 / (i + 1) as f64)
            .chain((0..q).map(|i| 0.1 / (i + 1) as f64))
            .collect();

        let fit = fit_css(
            &self.label,
            values,
            difference(values, self.d),
            differencing_polynomial(self.d, 0, 1),
            initial,
            |params| (params[..p].to_vec(), params[p..].to_vec()),
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
            ar: self.ar_coefficients().to_vec(),
            ma: self.ma_coefficients().to_vec(),
            seasonal_ar: vec![],
            seasonal_ma: vec![],
            sigma2: fit.sigma2,
            log_likelihood: fit.log_likelihood,
            aic: fit.aic,
            bic: fit.bic,
            nobs: fit.nobs,
            iterations: fit.iterations,
        })
    }

    fn name(&self) -> &str {
        "ARIMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn make_timestamps(n: usize) -> Vec<chrono::DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::hours(i as i64)).collect()
    }

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::new(make_timestamps(values.len()), values).unwrap()
    }

    #[test]
    fn arima_basic_fit() {
        let values: Vec<f64> = (0..50)
            .map(|i| 10.0 + 0.5 * i as f64 + (i as f64 * 0.3).sin())
            .collect();
        let mut model = ARIMA::new(1, 1, 1);
        model.fit(&series(values)).unwrap();

        assert_eq!(model.ar_coefficients().len(), 1);
        assert_eq!(model.ma_coefficients().len(), 1);
        assert!(model.ar_coefficients()[0].abs() <= 0.99);

        let forecast = model.predict(12).unwrap();
        assert_eq!(forecast.len(), 12);
        assert!(forecast.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn arima_ar1() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut values = vec![10.0];
        for i in 1..200 {
            values.push(0.7 * values[i - 1] + rng.gen::<f64>() - 0.5);
        }
        let mut model = ARIMA::new(1, 0, 0);
        model.fit(&series(values)).unwrap();

        assert!((model.ar_coefficients()[0] - 0.7).abs() < 0.15);
    }

    #[test]
    fn arima_with_differencing_continues_trend() {
        let values: Vec<f64> = (0..50).map(|i| 10.0 + 2.0 * i as f64).collect();
        let last = values[49];
        let mut model = ARIMA::new(1, 1, 0);
        model.fit(&series(values)).unwrap();

        assert_eq!(model.intercept(), Some(0.0));
        // Without a constant the AR term carries the slope, held at the coefficient bound
        let preds = model.predict(5).unwrap();
        assert!((preds[0] - (last + 2.0 * 0.99)).abs() < 1e-3);
        assert!(preds.windows(2).all(|w| w[1] > w[0]));
        let steps: Vec<f64> = preds.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(steps.windows(2).all(|s| s[1] < s[0]));
    }

    #[test]
    fn undifferenced_arima_estimates_the_mean() {
        let mut rng = StdRng::seed_from_u64(21);
        let values: Vec<f64> = (0..150).map(|_| 25.0 + rng.gen_range(-1.0..1.0)).collect();
        let mut model = ARIMA::new(1, 0, 0);
        model.fit(&series(values)).unwrap();

        let intercept = model.intercept().unwrap();
        assert!((intercept - 25.0).abs() < 0.5, "intercept {}", intercept);
        assert_eq!(model.summary().unwrap().intercept, intercept);
    }

    #[test]
    fn arima_second_order_differencing() {
        let values: Vec<f64> = (0..40).map(|i| (i * i) as f64 + (i as f64 * 0.9).cos()).collect();
        let mut model = ARIMA::new(0, 2, 1);
        model.fit(&series(values)).unwrap();
        assert_eq!(model.predict(4).unwrap().len(), 4);
        assert!(model.fitted_values().unwrap()[..2].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn arima_summary_and_information_criteria() {
        let values: Vec<f64> = (0..50).map(|i| 10.0 + (i as f64 * 0.3).sin()).collect();
        let mut model = ARIMA::new(1, 0, 1);
        model.fit(&series(values)).unwrap();

        let summary = model.summary().unwrap();
        assert_eq!(summary.model, "ARIMA(1,0,1)");
        assert_eq!(summary.ar.len(), 1);
        assert_eq!(summary.ma.len(), 1);
        assert!(summary.seasonal_ar.is_empty());
        assert!(summary.sigma2 >= 0.0);
        assert_eq!(model.aic(), Some(summary.aic));
        assert!(model.bic().unwrap() > model.aic().unwrap() - 1e-9);
    }

    #[test]
    fn arima_insufficient_data() {
        let mut model = ARIMA::new(2, 1, 1);
        assert!(matches!(
            model.fit(&series(vec![1.0, 2.0, 3.0])),
            Err(ExplorerError::InsufficientData { .. })
        ));
        assert!(!model.is_fitted());
    }

    #[test]
    fn arima_rejects_missing_values() {
        let mut values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        values[7] = f64::NAN;
        let mut model = ARIMA::default();
        assert!(matches!(
            model.fit(&series(values)),
            Err(ExplorerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn arima_requires_fit() {
        let model = ARIMA::new(1, 1, 1);
        assert_eq!(model.predict(5), Err(ExplorerError::NotFitted));
        assert!(model.summary().is_none());
        assert!(model.ar_coefficients().is_empty());
    }

    #[test]
    fn arima_default_and_name() {
        let model = ARIMA::default();
        assert_eq!(model.order(), (1, 1, 1));
        assert_eq!(model.name(), "ARIMA");
    }

    #[test]
    fn arima_residuals_align_with_input() {
        let values: Vec<f64> = (0..50).map(|i| 10.0 + i as f64 + (i as f64).sin()).collect();
        let mut model = ARIMA::new(1, 1, 1);
        model.fit(&series(values.clone())).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert_eq!(fitted.len(), values.len());
        for t in 0..values.len() {
            if fitted[t].is_finite() {
                assert!((values[t] - fitted[t] - residuals[t]).abs() < 1e-9);
            }
        }
    }
}
