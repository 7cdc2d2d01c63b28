//! # ts-explorer
//!
//! Exploratory time series analysis: load a CSV or spreadsheet upload,
//! pick a date column and a value column, then decompose, test for
//! stationarity, inspect the correlogram and forecast with ARIMA or
//! SARIMA.
//!
//! The [`pipeline`] runs every stage on one table; [`session`] holds the
//! per-user state around it. Rendering is left to a
//! [`PresentationSink`](pipeline::PresentationSink).

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod seasonality;
pub mod session;
pub mod utils;

pub use error::{ExplorerError, Result};

pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::core::{ForecastResult, Frequency, TimeSeries};
    pub use crate::error::{ExplorerError, Result};
    pub use crate::io::{load_table, FileFormat, RawTable};
    pub use crate::models::{Forecaster, ModelSpec, ModelStage};
    pub use crate::pipeline::{run_analysis, AnalysisReport, Panel, PresentationSink};
    pub use crate::session::{AnalysisSession, SessionRegistry};
}
