//! Spreadsheet workbook reader backed by calamine.

use crate::error::{ExplorerError, Result};
use crate::io::table::{Cell, RawTable};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Read the first sheet of a workbook into a [`RawTable`].
///
/// The first row is the header. Cells keep the type calamine reports for
/// them; no further inference is done.
pub fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ExplorerError::Format("workbook has no sheets".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ExplorerError::Format(format!("sheet '{}' is empty", sheet_name)))?;

    let names: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("Unnamed: {}", i),
            other => other.to_string().trim().to_string(),
        })
        .collect();

    let body: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    RawTable::from_rows(names, body)
}

/// Convert a calamine cell into a table cell.
pub(crate) fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_cell_types_are_preserved() {
        assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
        assert_eq!(cell_from_data(&Data::Int(42)), Cell::Number(42.0));
        assert_eq!(cell_from_data(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(cell_from_data(&Data::Bool(true)), Cell::Bool(true));
        assert_eq!(
            cell_from_data(&Data::String("2024-01-01".to_string())),
            Cell::Text("2024-01-01".to_string())
        );
    }

    #[test]
    fn iso_datetime_cells_become_text() {
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("2024-03-01T00:00:00".to_string())),
            Cell::Text("2024-03-01T00:00:00".to_string())
        );
    }

    #[test]
    fn garbage_bytes_are_a_format_error() {
        let result = read_spreadsheet(b"definitely not a workbook");
        assert!(matches!(result, Err(ExplorerError::Format(_))));
    }

    #[test]
    fn empty_input_is_a_format_error() {
        assert!(matches!(read_spreadsheet(&[]), Err(ExplorerError::Format(_))));
    }
}
