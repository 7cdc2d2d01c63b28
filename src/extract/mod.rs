//! Series extraction: a (date column, value column) pair to a [`TimeSeries`].

mod dates;
mod values;

pub use dates::parse_timestamp;
pub use values::{coerce_value, Coerced};

use crate::core::TimeSeries;
use crate::error::{ExplorerError, Result};
use crate::io::RawTable;
use tracing::debug;

/// Build a sorted, validated series from two table columns.
///
/// Every date must parse and every value must be numeric or an explicit
/// missing marker; the first failure is reported with its 1-based data row.
/// Rows are sorted by timestamp with a stable sort, and the output has
/// exactly one observation per input row. Two rows with the same timestamp
/// are rejected.
///
/// # Example
/// ```
/// use ts_explorer::extract::extract_series;
/// use ts_explorer::io::{load_table, FileFormat};
///
/// let csv = b"month,sales\n2024-02,12\n2024-01,10\n";
/// let table = load_table(csv, FileFormat::csv()).unwrap();
/// let series = extract_series(&table, "month", "sales").unwrap();
/// assert_eq!(series.values(), &[10.0, 12.0]);
/// ```
pub fn extract_series(table: &RawTable, date_column: &str, value_column: &str) -> Result<TimeSeries> {
    let date_cells = table.column(date_column)?;
    let value_cells = table.column(value_column)?;

    let mut timestamps = Vec::with_capacity(date_cells.len());
    for (i, cell) in date_cells.iter().enumerate() {
        let ts = parse_timestamp(cell).ok_or_else(|| ExplorerError::DateParse {
            row: i + 1,
            value: cell.to_string(),
        })?;
        timestamps.push(ts);
    }

    let mut values = Vec::with_capacity(value_cells.len());
    let mut missing = 0usize;
    for (i, cell) in value_cells.iter().enumerate() {
        match coerce_value(cell) {
            Coerced::Value(v) => values.push(v),
            Coerced::Missing => {
                missing += 1;
                values.push(f64::NAN);
            }
            Coerced::Invalid => {
                return Err(ExplorerError::ValueParse {
                    row: i + 1,
                    column: value_column.to_string(),
                    value: cell.to_string(),
                })
            }
        }
    }

    // Stable: equal timestamps keep their original row order
    let mut order: Vec<usize> = (0..timestamps.len()).collect();
    order.sort_by_key(|&i| timestamps[i]);

    for w in order.windows(2) {
        if timestamps[w[0]] == timestamps[w[1]] {
            return Err(ExplorerError::DuplicateTimestamp {
                first_row: w[0] + 1,
                second_row: w[1] + 1,
                timestamp: timestamps[w[0]].to_rfc3339(),
            });
        }
    }

    let sorted_timestamps = order.iter().map(|&i| timestamps[i]).collect();
    let sorted_values = order.iter().map(|&i| values[i]).collect();

    debug!(
        date_column,
        value_column,
        rows = order.len(),
        missing,
        "extracted series"
    );

    Ok(TimeSeries::new(sorted_timestamps, sorted_values)?.with_label(value_column))
}
