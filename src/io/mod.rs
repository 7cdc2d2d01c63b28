//! Data loading: uploaded bytes to an in-memory table.
//!
//! Two formats are supported:
//! - Delimited text (CSV/TSV) via the `csv` crate
//! - Spreadsheet workbooks (xlsx, xls, xlsb, ods) via `calamine`

mod delimited;
mod format;
mod spreadsheet;
mod table;

pub use delimited::read_delimited;
pub use format::FileFormat;
pub use spreadsheet::read_spreadsheet;
pub use table::{Cell, RawTable};

use crate::error::Result;
use tracing::debug;

/// Parse an uploaded byte stream according to its declared format.
///
/// # Example
/// ```
/// use ts_explorer::io::{load_table, FileFormat};
///
/// let table = load_table(b"date,value\n2024-01-01,3\n", FileFormat::csv()).unwrap();
/// assert_eq!(table.row_count(), 1);
/// ```
pub fn load_table(bytes: &[u8], format: FileFormat) -> Result<RawTable> {
    let table = match format {
        FileFormat::DelimitedText { delimiter } => read_delimited(bytes, delimiter)?,
        FileFormat::Spreadsheet => read_spreadsheet(bytes)?,
    };

    debug!(
        ?format,
        rows = table.row_count(),
        columns = table.width(),
        "loaded table"
    );

    Ok(table)
}
