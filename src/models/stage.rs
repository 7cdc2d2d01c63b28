//! Model stage: routes a [`ModelSpec`] to ARIMA or SARIMA, fits, forecasts.

use crate::core::{ForecastResult, Frequency, TimeSeries};
use crate::error::{ExplorerError, Result};
use crate::models::arima::{ARIMA, SARIMA};
use crate::models::{Forecaster, ModelSpec, ModelSummary};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Minimum share of timestamp gaps that must agree on the sampling frequency.
pub const FREQUENCY_TOLERANCE: f64 = 0.5;

/// A fitted model of either kind.
#[derive(Debug, Clone)]
pub enum FittedModel {
    /// Non-seasonal model.
    Arima(ARIMA),
    /// Seasonal model.
    Sarima(SARIMA),
}

impl FittedModel {
    fn for_spec(spec: ModelSpec) -> Self {
        match spec {
            ModelSpec::NonSeasonal { p, d, q } => Self::Arima(ARIMA::new(p, d, q)),
            ModelSpec::Seasonal {
                p,
                d,
                q,
                seasonal_p,
                seasonal_d,
                seasonal_q,
                period,
            } => Self::Sarima(SARIMA::new(
                (p, d, q),
                (seasonal_p, seasonal_d, seasonal_q),
                period,
            )),
        }
    }

    /// The model behind the common interface.
    pub fn as_forecaster(&self) -> &dyn Forecaster {
        match self {
            Self::Arima(m) => m,
            Self::Sarima(m) => m,
        }
    }

    fn as_forecaster_mut(&mut self) -> &mut dyn Forecaster {
        match self {
            Self::Arima(m) => m,
            Self::Sarima(m) => m,
        }
    }
}

/// Where the stage is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// No usable model.
    Unconfigured,
    /// A model is fitted, no forecast yet.
    Fitted,
    /// A forecast has been produced from the fitted model.
    Forecasted,
}

#[derive(Debug, Clone)]
struct FittedState {
    spec: ModelSpec,
    model: FittedModel,
    last_timestamp: DateTime<Utc>,
    frequency: Frequency,
}

#[derive(Debug, Clone)]
enum StageState {
    Unconfigured,
    Fitted(Box<FittedState>),
    Forecasted(Box<FittedState>, ForecastResult),
}

/// Holds at most one fitted model at a time.
///
/// `fit` always discards the previous model first, so a failed fit leaves
/// the stage [`StageStatus::Unconfigured`]. `forecast` may be called any
/// number of times once fitted.
///
/// # Example
/// ```
/// use chrono::{Months, TimeZone, Utc};
/// use ts_explorer::core::TimeSeries;
/// use ts_explorer::models::{ModelSpec, ModelStage};
///
/// let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// let timestamps = (0..40).map(|i| start + Months::new(i)).collect();
/// let values = (0..40).map(|i| 100.0 + i as f64 + (i as f64).sin()).collect();
/// let series = TimeSeries::new(timestamps, values).unwrap();
///
/// let mut stage = ModelStage::new();
/// stage.fit(&series, ModelSpec::arima(1, 1, 1)).unwrap();
/// let forecast = stage.forecast(6).unwrap();
/// assert_eq!(forecast.horizon(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct ModelStage {
    state: StageState,
}

impl Default for ModelStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStage {
    /// An empty stage.
    pub fn new() -> Self {
        Self {
            state: StageState::Unconfigured,
        }
    }

    /// Current lifecycle position.
    pub fn status(&self) -> StageStatus {
        match self.state {
            StageState::Unconfigured => StageStatus::Unconfigured,
            StageState::Fitted(_) => StageStatus::Fitted,
            StageState::Forecasted(..) => StageStatus::Forecasted,
        }
    }

    /// Drop any fitted model.
    pub fn reset(&mut self) {
        self.state = StageState::Unconfigured;
    }

    /// Fit `spec` to `series`.
    ///
    /// Interior gaps are linearly interpolated before fitting. The sampling
    /// frequency is inferred here so forecasts can be timestamped.
    pub fn fit(&mut self, series: &TimeSeries, spec: ModelSpec) -> Result<()> {
        self.state = StageState::Unconfigured;
        spec.validate()?;

        let last_timestamp = series.last_timestamp().ok_or(ExplorerError::InsufficientData {
            needed: 2,
            got: 0,
        })?;
        let frequency = series.infer_frequency(FREQUENCY_TOLERANCE)?;

        let filled = if series.has_missing_values() {
            warn!(missing = series.missing_count(), "interpolating gaps before model fit");
            series.interpolated(true)
        } else {
            series.clone()
        };
        if filled.has_missing_values() {
            return Err(ExplorerError::InsufficientData {
                needed: 2,
                got: series.len() - series.missing_count(),
            });
        }

        info!(model = %spec, n = series.len(), %frequency, "fitting model");

        let mut model = FittedModel::for_spec(spec);
        model.as_forecaster_mut().fit(&filled)?;

        self.state = StageState::Fitted(Box::new(FittedState {
            spec,
            model,
            last_timestamp,
            frequency,
        }));
        Ok(())
    }

    /// Forecast `horizon` steps past the last observation.
    ///
    /// # Errors
    /// `NotFitted` before a successful fit; `InvalidParameter` for a zero
    /// horizon.
    pub fn forecast(&mut self, horizon: usize) -> Result<ForecastResult> {
        let fitted = self.fitted().ok_or(ExplorerError::NotFitted)?;
        if horizon == 0 {
            return Err(ExplorerError::InvalidParameter(
                "forecast horizon must be at least 1".to_string(),
            ));
        }

        let values = fitted.model.as_forecaster().predict(horizon)?;
        let result = ForecastResult::extend_from(fitted.last_timestamp, fitted.frequency, values)?;
        debug!(horizon, model = %fitted.spec, "forecast produced");

        self.state = match std::mem::replace(&mut self.state, StageState::Unconfigured) {
            StageState::Fitted(state) | StageState::Forecasted(state, _) => {
                StageState::Forecasted(state, result.clone())
            }
            StageState::Unconfigured => StageState::Unconfigured,
        };
        Ok(result)
    }

    /// Specification of the fitted model.
    pub fn spec(&self) -> Option<ModelSpec> {
        self.fitted().map(|f| f.spec)
    }

    /// The fitted model, if any.
    pub fn model(&self) -> Option<&FittedModel> {
        self.fitted().map(|f| &f.model)
    }

    /// Parameters and fit statistics of the fitted model.
    pub fn summary(&self) -> Option<ModelSummary> {
        self.fitted().and_then(|f| f.model.as_forecaster().summary())
    }

    /// Inferred sampling frequency of the fitted series.
    pub fn frequency(&self) -> Option<Frequency> {
        self.fitted().map(|f| f.frequency)
    }

    /// Most recent forecast.
    pub fn last_forecast(&self) -> Option<&ForecastResult> {
        match &self.state {
            StageState::Forecasted(_, forecast) => Some(forecast),
            _ => None,
        }
    }

    fn fitted(&self) -> Option<&FittedState> {
        match &self.state {
            StageState::Unconfigured => None,
            StageState::Fitted(state) | StageState::Forecasted(state, _) => Some(state),
        }
    }
}
