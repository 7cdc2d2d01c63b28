//! Per-user analysis sessions.
//!
//! A session owns one uploaded table, the parameters chosen for it and the
//! model stage of its last run. Sessions never share state; the registry
//! only maps ids to them.

use crate::config::AnalysisConfig;
use crate::core::ForecastResult;
use crate::error::{ExplorerError, Result};
use crate::io::{load_table, Cell, FileFormat, RawTable};
use crate::pipeline::{AnalysisPipeline, AnalysisReport};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Conventional row count for [`AnalysisSession::preview`].
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone)]
struct Upload {
    file_name: String,
    format: FileFormat,
    table: RawTable,
}

/// One user's working state.
///
/// Editing parameters never triggers analysis; only [`run`] does.
///
/// [`run`]: AnalysisSession::run
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    upload: Option<Upload>,
    config: AnalysisConfig,
    pipeline: AnalysisPipeline,
    report: Option<AnalysisReport>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an uploaded file and make it the session's table.
    ///
    /// A successful upload resets parameters and drops any fitted model
    /// and report. The first column is preselected as the date column and
    /// the second (or the first, for a one-column table) as the value
    /// column. A failed upload leaves the session unchanged.
    pub fn upload(&mut self, bytes: &[u8], file_name: &str, mime: Option<&str>) -> Result<&RawTable> {
        let format = FileFormat::sniff(file_name, mime)?;
        let table = load_table(bytes, format)?;

        let names = table.column_names();
        let date_column = names.first().cloned().unwrap_or_default();
        let value_column = names.get(1).or(names.first()).cloned().unwrap_or_default();
        info!(
            file_name,
            ?format,
            rows = table.row_count(),
            columns = table.width(),
            "file uploaded"
        );

        self.config = AnalysisConfig::new(date_column, value_column);
        self.pipeline.reset();
        self.report = None;
        let upload = self.upload.insert(Upload {
            file_name: file_name.to_string(),
            format,
            table,
        });
        Ok(&upload.table)
    }

    /// The uploaded table.
    pub fn table(&self) -> Option<&RawTable> {
        self.upload.as_ref().map(|u| &u.table)
    }

    /// Name of the uploaded file.
    pub fn file_name(&self) -> Option<&str> {
        self.upload.as_ref().map(|u| u.file_name.as_str())
    }

    /// Format the upload was read as.
    pub fn format(&self) -> Option<FileFormat> {
        self.upload.as_ref().map(|u| u.format)
    }

    /// Column names available for selection; empty before an upload.
    pub fn column_names(&self) -> &[String] {
        match self.table() {
            Some(table) => table.column_names(),
            None => &[],
        }
    }

    /// First `n` rows of the uploaded table.
    pub fn preview(&self, n: usize) -> Option<Vec<Vec<&Cell>>> {
        self.table().map(|t| t.head(n))
    }

    /// Current parameters.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replace the parameters. Nothing is recomputed until [`run`].
    ///
    /// [`run`]: AnalysisSession::run
    pub fn configure(&mut self, config: AnalysisConfig) {
        debug!(?config, "parameters updated");
        self.config = config;
    }

    /// Run the full analysis on the uploaded table with the current
    /// parameters. On failure the previous report and model are discarded.
    pub fn run(&mut self) -> Result<&AnalysisReport> {
        self.report = None;
        self.pipeline.reset();
        let upload = self.upload.as_ref().ok_or_else(|| {
            ExplorerError::InvalidParameter("no file has been uploaded".to_string())
        })?;
        let report = self.pipeline.run(&upload.table, &self.config)?;
        Ok(self.report.insert(report))
    }

    /// Report of the last successful run.
    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    /// Forecast a new horizon from the last fitted model.
    pub fn reforecast(&mut self, horizon: usize) -> Result<ForecastResult> {
        self.pipeline.reforecast(horizon)
    }
}

/// Opaque session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Isolated sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_id: u64,
    sessions: HashMap<SessionId, AnalysisSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty session.
    pub fn open(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(id, AnalysisSession::new());
        debug!(%id, "session opened");
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&AnalysisSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut AnalysisSession> {
        self.sessions.get_mut(&id)
    }

    /// Remove a session, returning its state.
    pub fn close(&mut self, id: SessionId) -> Option<AnalysisSession> {
        let session = self.sessions.remove(&id);
        if session.is_some() {
            debug!(%id, "session closed");
        }
        session
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
