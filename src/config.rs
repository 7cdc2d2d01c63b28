//! User-chosen parameters for one analysis run.

use crate::error::{ExplorerError, Result};
use crate::models::ModelSpec;
use crate::seasonality::{DecompositionConfig, DecompositionMethod};
use std::ops::RangeInclusive;

/// Allowed correlogram lag bounds.
pub const MAX_LAG_RANGE: RangeInclusive<usize> = 10..=60;

/// Default correlogram lag bound.
pub const DEFAULT_MAX_LAG: usize = 40;

/// Default forecast horizon.
pub const DEFAULT_HORIZON: usize = 12;

/// Everything the pipeline needs besides the table itself.
///
/// Built with consuming `with_*` setters and checked by [`validate`]
/// before a run starts.
///
/// [`validate`]: AnalysisConfig::validate
///
/// # Example
/// ```
/// use ts_explorer::config::AnalysisConfig;
/// use ts_explorer::models::ModelSpec;
///
/// let config = AnalysisConfig::new("date", "sales")
///     .with_period(4)
///     .with_model(ModelSpec::sarima((1, 0, 0), (0, 1, 1), 4))
///     .with_horizon(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Column holding the timestamps.
    pub date_column: String,
    /// Column holding the observations.
    pub value_column: String,
    /// Decomposition period, algorithm and robustness.
    pub decomposition: DecompositionConfig,
    /// Largest lag in the correlogram.
    pub max_lag: usize,
    /// Model to fit.
    pub model: ModelSpec,
    /// Number of steps to forecast.
    pub horizon: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            date_column: String::new(),
            value_column: String::new(),
            decomposition: DecompositionConfig::default(),
            max_lag: DEFAULT_MAX_LAG,
            model: ModelSpec::default(),
            horizon: DEFAULT_HORIZON,
        }
    }
}

impl AnalysisConfig {
    /// Defaults for the given column pair.
    pub fn new(date_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            value_column: value_column.into(),
            ..Self::default()
        }
    }

    /// Set the date column.
    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = column.into();
        self
    }

    /// Set the value column.
    pub fn with_value_column(mut self, column: impl Into<String>) -> Self {
        self.value_column = column.into();
        self
    }

    /// Set the decomposition period.
    pub fn with_period(mut self, period: usize) -> Self {
        self.decomposition = self.decomposition.with_period(period);
        self
    }

    /// Set the decomposition algorithm.
    pub fn with_decomposition_method(mut self, method: DecompositionMethod) -> Self {
        self.decomposition = self.decomposition.with_method(method);
        self
    }

    /// Enable robust STL.
    pub fn with_robust(mut self, robust: bool) -> Self {
        self.decomposition = self.decomposition.with_robust(robust);
        self
    }

    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = max_lag;
        self
    }

    pub fn with_model(mut self, model: ModelSpec) -> Self {
        self.model = model;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Check every parameter against its bound.
    pub fn validate(&self) -> Result<()> {
        if self.date_column.is_empty() || self.value_column.is_empty() {
            return Err(ExplorerError::InvalidParameter(
                "both a date column and a value column must be selected".to_string(),
            ));
        }
        self.decomposition.validate()?;
        if !MAX_LAG_RANGE.contains(&self.max_lag) {
            return Err(ExplorerError::InvalidParameter(format!(
                "max lag must be in {}..={}, got {}",
                MAX_LAG_RANGE.start(),
                MAX_LAG_RANGE.end(),
                self.max_lag
            )));
        }
        self.model.validate()?;
        if self.horizon == 0 {
            return Err(ExplorerError::InvalidParameter(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AnalysisConfig::new("d", "v");
        assert_eq!(config.decomposition.period, 12);
        assert_eq!(config.decomposition.method, DecompositionMethod::Stl);
        assert_eq!(config.max_lag, 40);
        assert_eq!(config.horizon, 12);
        assert_eq!(config.model, ModelSpec::arima(1, 1, 1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unselected_columns_are_rejected() {
        assert!(matches!(
            AnalysisConfig::default().validate(),
            Err(ExplorerError::InvalidParameter(_))
        ));
        assert!(AnalysisConfig::default()
            .with_date_column("d")
            .with_value_column("v")
            .validate()
            .is_ok());
    }

    #[test]
    fn bounds_are_enforced() {
        let base = AnalysisConfig::new("d", "v");
        assert!(base.clone().with_period(1).validate().is_err());
        assert!(base.clone().with_max_lag(9).validate().is_err());
        assert!(base.clone().with_max_lag(61).validate().is_err());
        assert!(base.clone().with_max_lag(60).validate().is_ok());
        assert!(base.clone().with_horizon(0).validate().is_err());
        assert!(base
            .clone()
            .with_model(ModelSpec::sarima((1, 1, 1), (1, 3, 1), 12))
            .validate()
            .is_err());
    }

    #[test]
    fn decomposition_setters_compose() {
        let config = AnalysisConfig::new("d", "v")
            .with_period(7)
            .with_decomposition_method(DecompositionMethod::Classical)
            .with_robust(true);
        assert_eq!(config.decomposition.period, 7);
        assert_eq!(config.decomposition.method, DecompositionMethod::Classical);
        assert!(config.decomposition.robust);
    }
}
