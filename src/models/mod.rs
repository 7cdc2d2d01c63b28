//! Forecasting models and the stage that fits them.

mod spec;
mod stage;
mod traits;

pub mod arima;

pub use arima::{ARIMA, SARIMA};
pub use spec::{ModelSpec, DIFFERENCING_RANGE, ORDER_RANGE, SEASONAL_PERIOD_RANGE};
pub use stage::{FittedModel, ModelStage, StageStatus, FREQUENCY_TOLERANCE};
pub use traits::{BoxedForecaster, Forecaster, ModelSummary};
