//! In-memory representation of an uploaded table.

use crate::error::{ExplorerError, Result};
use chrono::NaiveDateTime;
use std::fmt;

/// A single cell as produced by the underlying parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value.
    Empty,
    /// Raw text.
    Text(String),
    /// Native numeric cell (spreadsheets only).
    Number(f64),
    /// Native boolean cell (spreadsheets only).
    Bool(bool),
    /// Native date/time cell (spreadsheets only).
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Check whether the cell holds no value.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

/// A table of named columns with equal length.
///
/// Column order follows the source file. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    names: Vec<String>,
    columns: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table from column names and column data.
    ///
    /// Fails if the counts disagree, a name repeats, or the columns have
    /// different lengths.
    pub fn new(names: Vec<String>, columns: Vec<Vec<Cell>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(ExplorerError::Format(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }

        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ExplorerError::Format(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }

        if let Some(first) = columns.first() {
            let rows = first.len();
            for (name, column) in names.iter().zip(columns.iter()) {
                if column.len() != rows {
                    return Err(ExplorerError::Format(format!(
                        "column '{}' has {} rows, expected {}",
                        name,
                        column.len(),
                        rows
                    )));
                }
            }
        }

        Ok(Self { names, columns })
    }

    /// Build a table from a header and row-major records.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = names.len();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); width];

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(ExplorerError::Format(format!(
                    "row {} has {} fields, expected {}",
                    i + 1,
                    row.len(),
                    width
                )));
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell);
            }
        }

        Self::new(names, columns)
    }

    /// Column names in file order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&[Cell]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
            .ok_or_else(|| ExplorerError::ColumnNotFound {
                column: name.to_string(),
                available: self.names.clone(),
            })
    }

    /// The first `n` rows, for previewing an upload.
    pub fn head(&self, n: usize) -> Vec<Vec<&Cell>> {
        let rows = n.min(self.row_count());
        (0..rows)
            .map(|r| self.columns.iter().map(|col| &col[r]).collect())
            .collect()
    }
}
