//! The analysis pipeline: extract, decompose, diagnose, fit, forecast.

mod report;
mod sink;

pub use report::AnalysisReport;
pub use sink::{CorrelationKind, Panel, PresentationSink, TracingSink};

use crate::config::AnalysisConfig;
use crate::core::ForecastResult;
use crate::diagnostics::run_diagnostics;
use crate::error::{ExplorerError, Result};
use crate::extract::extract_series;
use crate::io::RawTable;
use crate::models::ModelStage;
use crate::seasonality::decompose;
use tracing::{debug, info};

/// Runs analyses and keeps the model stage of the latest run.
///
/// Every stage is a pure function of the table and the configuration, so
/// running twice with the same inputs yields the same report. Any stage
/// error aborts the run without a report.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    stage: ModelStage,
}

impl AnalysisPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every stage on `table` with `config`.
    ///
    /// The model from any earlier run is dropped first, so a failed run
    /// leaves nothing to reforecast from.
    pub fn run(&mut self, table: &RawTable, config: &AnalysisConfig) -> Result<AnalysisReport> {
        self.stage.reset();
        config.validate()?;
        info!(
            rows = table.row_count(),
            date_column = %config.date_column,
            value_column = %config.value_column,
            "starting analysis"
        );

        let series = extract_series(table, &config.date_column, &config.value_column)?;
        debug!(n = series.len(), missing = series.missing_count(), "series extracted");

        let decomposition = decompose(&series, &config.decomposition)?;
        let diagnostics = run_diagnostics(&series, config.max_lag)?;

        self.stage.fit(&series, config.model)?;
        let forecast = self.stage.forecast(config.horizon)?;
        let model = self.stage.summary().ok_or(ExplorerError::NotFitted)?;

        info!(
            model = %model.model,
            horizon = forecast.horizon(),
            p_value = diagnostics.stationarity.p_value,
            "analysis complete"
        );

        Ok(AnalysisReport {
            series,
            decomposition,
            diagnostics,
            model,
            forecast,
        })
    }

    /// Forecast again from the model fitted by the last run.
    pub fn reforecast(&mut self, horizon: usize) -> Result<ForecastResult> {
        self.stage.forecast(horizon)
    }

    /// The model stage of the last run.
    pub fn stage(&self) -> &ModelStage {
        &self.stage
    }

    /// Drop the fitted model.
    pub fn reset(&mut self) {
        self.stage.reset();
    }
}

/// Run a complete analysis with a fresh model stage.
///
/// # Example
/// ```
/// use ts_explorer::config::AnalysisConfig;
/// use ts_explorer::io::{load_table, FileFormat};
/// use ts_explorer::pipeline::run_analysis;
///
/// let mut csv = String::from("month,value\n");
/// for i in 0..36 {
///     let v = 100.0 + i as f64 + 10.0 * (i as f64 * std::f64::consts::PI / 6.0).sin();
///     csv.push_str(&format!("{}-{:02},{}\n", 2021 + i / 12, i % 12 + 1, v));
/// }
/// let table = load_table(csv.as_bytes(), FileFormat::csv()).unwrap();
///
/// let config = AnalysisConfig::new("month", "value").with_max_lag(20).with_horizon(6);
/// let report = run_analysis(&table, &config).unwrap();
/// assert_eq!(report.decomposition.trend.len(), 36);
/// assert_eq!(report.forecast.horizon(), 6);
/// ```
pub fn run_analysis(table: &RawTable, config: &AnalysisConfig) -> Result<AnalysisReport> {
    AnalysisPipeline::new().run(table, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{load_table, FileFormat};
    use crate::models::{ModelSpec, StageStatus};

    fn monthly_csv(n: usize) -> Vec<u8> {
        let mut csv = String::from("date,sales\n");
        for i in 0..n {
            let v = 50.0 + 0.5 * i as f64 + 8.0 * (i as f64 * std::f64::consts::PI / 6.0).cos();
            csv.push_str(&format!("{}-{:02}-01,{:.3}\n", 2018 + i / 12, i % 12 + 1, v));
        }
        csv.into_bytes()
    }

    #[derive(Default)]
    struct Titles(Vec<String>);

    impl PresentationSink for Titles {
        fn render(&mut self, panel: Panel<'_>) {
            self.0.push(panel.title());
        }
    }

    #[test]
    fn panels_arrive_in_report_order() {
        let table = load_table(&monthly_csv(48), FileFormat::csv()).unwrap();
        let report = run_analysis(&table, &AnalysisConfig::new("date", "sales")).unwrap();

        let mut sink = Titles::default();
        report.render_to(&mut sink);
        assert_eq!(
            sink.0,
            vec![
                "Original series",
                "STL decomposition",
                "Stationarity test (ADF)",
                "ACF",
                "PACF",
                "ARIMA(1,1,1) forecast",
            ]
        );
    }

    #[test]
    fn pipeline_keeps_model_for_reforecast() {
        let table = load_table(&monthly_csv(48), FileFormat::csv()).unwrap();
        let mut pipeline = AnalysisPipeline::new();
        let config = AnalysisConfig::new("date", "sales")
            .with_model(ModelSpec::sarima((0, 1, 1), (0, 1, 1), 12))
            .with_horizon(3);

        let report = pipeline.run(&table, &config).unwrap();
        assert_eq!(report.forecast.horizon(), 3);
        assert_eq!(pipeline.stage().status(), StageStatus::Forecasted);

        let longer = pipeline.reforecast(24).unwrap();
        assert_eq!(longer.horizon(), 24);
        assert_eq!(&longer.values()[..3], report.forecast.values());
    }

    #[test]
    fn invalid_config_stops_before_extraction() {
        let table = load_table(&monthly_csv(48), FileFormat::csv()).unwrap();
        let config = AnalysisConfig::new("date", "missing_column").with_max_lag(5);
        assert!(matches!(
            run_analysis(&table, &config),
            Err(ExplorerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn unknown_column_is_reported() {
        let table = load_table(&monthly_csv(48), FileFormat::csv()).unwrap();
        let config = AnalysisConfig::new("date", "revenue");
        match run_analysis(&table, &config) {
            Err(ExplorerError::ColumnNotFound { column, available }) => {
                assert_eq!(column, "revenue");
                assert_eq!(available, vec!["date", "sales"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn failed_fit_yields_no_report() {
        let table = load_table(&monthly_csv(30), FileFormat::csv()).unwrap();
        let config = AnalysisConfig::new("date", "sales")
            .with_max_lag(10)
            .with_model(ModelSpec::sarima((2, 1, 2), (2, 1, 2), 12));
        let mut pipeline = AnalysisPipeline::new();
        assert!(matches!(
            pipeline.run(&table, &config),
            Err(ExplorerError::InsufficientData { .. })
        ));
        assert_eq!(pipeline.stage().status(), StageStatus::Unconfigured);
    }

    #[test]
    fn failed_rerun_drops_the_previous_model() {
        let table = load_table(&monthly_csv(48), FileFormat::csv()).unwrap();
        let mut pipeline = AnalysisPipeline::new();
        pipeline.run(&table, &AnalysisConfig::new("date", "sales")).unwrap();
        assert_eq!(pipeline.stage().status(), StageStatus::Forecasted);

        let missing = AnalysisConfig::new("date", "missing_col");
        assert!(matches!(
            pipeline.run(&table, &missing),
            Err(ExplorerError::ColumnNotFound { .. })
        ));
        assert_eq!(pipeline.stage().status(), StageStatus::Unconfigured);
        assert_eq!(pipeline.reforecast(3), Err(ExplorerError::NotFitted));
    }

    #[test]
    fn invalid_config_on_rerun_drops_the_previous_model() {
        let table = load_table(&monthly_csv(48), FileFormat::csv()).unwrap();
        let mut pipeline = AnalysisPipeline::new();
        pipeline.run(&table, &AnalysisConfig::new("date", "sales")).unwrap();

        let bad = AnalysisConfig::new("date", "sales").with_max_lag(5);
        assert!(pipeline.run(&table, &bad).is_err());
        assert!(pipeline.stage().summary().is_none());
        assert_eq!(pipeline.reforecast(1), Err(ExplorerError::NotFitted));
    }
}
