//! Numeric coercion of value cells.

use crate::io::Cell;

/// Text that marks a missing value.
const NA_MARKERS: &[&str] = &["na", "n/a", "nan", "null", "none", "-", "#n/a"];

/// Outcome of coercing one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    /// A finite number.
    Value(f64),
    /// An explicit missing value.
    Missing,
    /// Not a number.
    Invalid,
}

/// Coerce a cell to a number.
pub fn coerce_value(cell: &Cell) -> Coerced {
    match cell {
        Cell::Empty => Coerced::Missing,
        Cell::Number(v) if v.is_finite() => Coerced::Value(*v),
        Cell::Number(_) => Coerced::Missing,
        Cell::Text(s) => coerce_text(s.trim()),
        Cell::Bool(_) | Cell::DateTime(_) => Coerced::Invalid,
    }
}

fn coerce_text(s: &str) -> Coerced {
    if s.is_empty() || NA_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) {
        return Coerced::Missing;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Coerced::Value(v),
        Ok(_) => Coerced::Missing,
        Err(_) => Coerced::Invalid,
    }
}
