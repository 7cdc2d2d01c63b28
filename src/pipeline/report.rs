//! The outcome of one complete analysis run.

use crate::core::{ForecastResult, TimeSeries};
use crate::diagnostics::DiagnosticsResult;
use crate::models::ModelSummary;
use crate::pipeline::sink::{CorrelationKind, Panel, PresentationSink};
use crate::seasonality::DecompositionResult;

/// Everything produced by a successful run. Never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Extracted series, sorted, `NaN` where missing.
    pub series: TimeSeries,
    pub decomposition: DecompositionResult,
    pub diagnostics: DiagnosticsResult,
    /// Fitted model parameters.
    pub model: ModelSummary,
    pub forecast: ForecastResult,
}

impl AnalysisReport {
    /// Hand every panel to `sink`: raw series, decomposition, stationarity,
    /// ACF, PACF, then the forecast overlay.
    pub fn render_to<S: PresentationSink + ?Sized>(&self, sink: &mut S) {
        sink.render(Panel::RawSeries {
            timestamps: self.series.timestamps(),
            values: self.series.values(),
        });

        let d = &self.decomposition;
        sink.render(Panel::Decomposition {
            method: d.method.to_string(),
            period: d.period,
            timestamps: &d.timestamps,
            observed: &d.observed,
            trend: &d.trend,
            seasonal: &d.seasonal,
            residual: &d.residual,
        });

        let adf = &self.diagnostics.stationarity;
        sink.render(Panel::Stationarity {
            verdict: adf.verdict,
            statistic: adf.statistic,
            p_value: adf.p_value,
            critical_values: adf.critical_values,
        });

        let correlogram = &self.diagnostics.correlogram;
        for (kind, values) in [
            (CorrelationKind::Acf, &correlogram.acf),
            (CorrelationKind::Pacf, &correlogram.pacf),
        ] {
            sink.render(Panel::Correlation {
                kind,
                values,
                confidence_band: correlogram.confidence_band,
            });
        }

        sink.render(Panel::ForecastOverlay {
            model: self.model.model.clone(),
            observed_timestamps: self.series.timestamps(),
            observed: self.series.values(),
            forecast_timestamps: self.forecast.timestamps(),
            forecast: self.forecast.values(),
        });
    }
}
