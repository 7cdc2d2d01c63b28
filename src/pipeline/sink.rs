//! Presentation seam: the report hands labelled numeric panels to a sink.

use crate::diagnostics::{CriticalValues, StationarityVerdict};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::info;

/// Which correlation function a [`Panel::Correlation`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationKind {
    /// Autocorrelation function.
    Acf,
    /// Partial autocorrelation function.
    Pacf,
}

impl fmt::Display for CorrelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acf => write!(f, "ACF"),
            Self::Pacf => write!(f, "PACF"),
        }
    }
}

/// One displayable block of an analysis report.
///
/// Panels borrow from the report; a sink that needs to keep data past the
/// `render` call copies it.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<'a> {
    /// The extracted series as a line.
    RawSeries {
        timestamps: &'a [DateTime<Utc>],
        values: &'a [f64],
    },
    /// Four stacked lines: observed, trend, seasonal, residual.
    Decomposition {
        method: String,
        period: usize,
        timestamps: &'a [DateTime<Utc>],
        observed: &'a [f64],
        trend: &'a [f64],
        seasonal: &'a [f64],
        residual: &'a [f64],
    },
    /// ADF verdict with its p-value.
    Stationarity {
        verdict: StationarityVerdict,
        statistic: f64,
        p_value: f64,
        critical_values: CriticalValues,
    },
    /// Bar chart by lag with a symmetric significance band.
    Correlation {
        kind: CorrelationKind,
        values: &'a [f64],
        confidence_band: f64,
    },
    /// Observed series followed by the forecast.
    ForecastOverlay {
        model: String,
        observed_timestamps: &'a [DateTime<Utc>],
        observed: &'a [f64],
        forecast_timestamps: &'a [DateTime<Utc>],
        forecast: &'a [f64],
    },
}

impl Panel<'_> {
    /// Display title.
    pub fn title(&self) -> String {
        match self {
            Panel::RawSeries { .. } => "Original series".to_string(),
            Panel::Decomposition { method, .. } => format!("{} decomposition", method),
            Panel::Stationarity { .. } => "Stationarity test (ADF)".to_string(),
            Panel::Correlation { kind, .. } => kind.to_string(),
            Panel::ForecastOverlay { model, .. } => format!("{} forecast", model),
        }
    }

    /// One-line summary used for logs and text output.
    pub fn caption(&self) -> String {
        match self {
            Panel::Stationarity {
                verdict, p_value, ..
            } => format!("{} series (p-value = {:.4})", verdict, p_value),
            Panel::RawSeries { values, .. } => format!("{} observations", values.len()),
            Panel::Decomposition { period, trend, .. } => {
                format!("period {}, {} points", period, trend.len())
            }
            Panel::Correlation { values, .. } => format!("lags 0..={}", values.len().saturating_sub(1)),
            Panel::ForecastOverlay { forecast, .. } => format!("{} steps ahead", forecast.len()),
        }
    }
}

/// Consumer of rendered panels (a plotting layer, a UI, a test recorder).
pub trait PresentationSink {
    /// Receive one panel. Panels arrive in report order.
    fn render(&mut self, panel: Panel<'_>);
}

impl<S: PresentationSink + ?Sized> PresentationSink for &mut S {
    fn render(&mut self, panel: Panel<'_>) {
        (**self).render(panel)
    }
}

/// Sink that records each panel as an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn render(&mut self, panel: Panel<'_>) {
        info!(title = %panel.title(), caption = %panel.caption(), "panel");
    }
}
