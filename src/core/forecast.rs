//! Forecast result structure for holding timestamped predictions.

use crate::core::frequency::Frequency;
use crate::error::{ExplorerError, Result};
use chrono::{DateTime, Utc};

/// Point forecasts continuing a series at its inferred frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    frequency: Frequency,
}

impl ForecastResult {
    /// Pair predictions with the timestamps following `last`.
    pub fn extend_from(
        last: DateTime<Utc>,
        frequency: Frequency,
        values: Vec<f64>,
    ) -> Result<Self> {
        let timestamps = frequency.extrapolate(last, values.len())?;
        Self::new(timestamps, values, frequency)
    }

    /// Create a forecast from explicit timestamps.
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
        frequency: Frequency,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ExplorerError::InvalidParameter(format!(
                "{} forecast values for {} timestamps",
                values.len(),
                timestamps.len()
            )));
        }
        Ok(Self {
            timestamps,
            values,
            frequency,
        })
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forecast timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Point predictions.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Frequency used to generate the timestamps.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }
}
