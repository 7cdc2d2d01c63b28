//! TimeSeries data structure for representing temporal data.

use crate::core::frequency::Frequency;
use crate::error::{ExplorerError, Result};
use chrono::{DateTime, Utc};

/// A univariate time series with strictly increasing timestamps.
///
/// Values may be `NaN`, which marks a missing observation.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a new series.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(ExplorerError::InvalidParameter(format!(
                "{} values for {} timestamps",
                values.len(),
                timestamps.len()
            )));
        }

        // Validate timestamps are strictly increasing
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ExplorerError::InvalidParameter(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
        })
    }

    /// Attach a label (usually the source column name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Last observation timestamp.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Number of missing (NaN or infinite) values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.missing_count() > 0
    }

    /// Return a copy with missing observations dropped.
    pub fn without_missing(&self) -> TimeSeries {
        let (timestamps, values): (Vec<_>, Vec<_>) = self
            .timestamps
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| v.is_finite())
            .map(|(t, v)| (*t, *v))
            .unzip();

        TimeSeries {
            timestamps,
            values,
            label: self.label.clone(),
        }
    }

    /// Return a copy with linear interpolation for missing values.
    pub fn interpolated(&self, fill_edges: bool) -> TimeSeries {
        TimeSeries {
            timestamps: self.timestamps.clone(),
            values: interpolate_series(&self.values, fill_edges),
            label: self.label.clone(),
        }
    }

    /// Infer the sampling frequency from the timestamps.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Frequency> {
        Frequency::infer(&self.timestamps, tolerance)
    }
}

/// Fill non-finite values by straight lines between the nearest finite
/// neighbours. With `fill_edges`, leading and trailing gaps take the value
/// of the closest finite point; otherwise they stay as they are.
pub(crate) fn interpolate_series(values: &[f64], fill_edges: bool) -> Vec<f64> {
    let mut out = values.to_vec();
    let anchors: Vec<usize> = (0..values.len()).filter(|&i| values[i].is_finite()).collect();

    for pair in anchors.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let slope = (values[b] - values[a]) / (b - a) as f64;
        for k in a + 1..b {
            out[k] = values[a] + slope * (k - a) as f64;
        }
    }

    if fill_edges {
        if let (Some(&first), Some(&last)) = (anchors.first(), anchors.last()) {
            out[..first].fill(values[first]);
            out[last + 1..].fill(values[last]);
        }
    }
    out
}
