//! Error types for the ts-explorer pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Errors that can occur while loading, analysing or forecasting a series.
///
/// Every variant is terminal for the current analysis run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplorerError {
    /// The uploaded bytes could not be parsed in the declared format.
    #[error("format error: {0}")]
    Format(String),

    /// A selected column does not exist in the table.
    #[error("column '{column}' not found (available: {})", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// A date cell could not be parsed into a timestamp.
    #[error("could not parse date '{value}' at row {row}")]
    DateParse { row: usize, value: String },

    /// A value cell could not be coerced to a number.
    #[error("could not parse '{value}' in column '{column}' at row {row} as a number")]
    ValueParse {
        row: usize,
        column: String,
        value: String,
    },

    /// Two rows carry the same timestamp.
    #[error("duplicate timestamp {timestamp} at rows {first_row} and {second_row}")]
    DuplicateTimestamp {
        first_row: usize,
        second_row: usize,
        timestamp: String,
    },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The optimiser failed to converge while fitting a model.
    #[error("{model} fit did not converge: {reason}")]
    Convergence { model: String, reason: String },

    /// A forecast was requested before a successful fit.
    #[error("model must be fitted before forecasting")]
    NotFitted,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    Computation(String),
}

impl From<csv::Error> for ExplorerError {
    fn from(err: csv::Error) -> Self {
        ExplorerError::Format(format!("malformed delimited text: {}", err))
    }
}

impl From<calamine::Error> for ExplorerError {
    fn from(err: calamine::Error) -> Self {
        ExplorerError::Format(format!("unreadable spreadsheet: {}", err))
    }
}
