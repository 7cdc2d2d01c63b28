//! Delimited text (CSV/TSV) reader.

use crate::error::{ExplorerError, Result};
use crate::io::table::{Cell, RawTable};
use csv::ReaderBuilder;

/// Read delimited text with a header row into a [`RawTable`].
///
/// Cells are kept as text; empty fields become [`Cell::Empty`]. Rows with
/// a field count different from the header are rejected.
pub fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<RawTable> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ExplorerError::Format("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    RawTable::from_rows(headers, rows)
}
