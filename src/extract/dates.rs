//! Date cell parsing.

use crate::io::Cell;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Date-time layouts tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts tried in order. Slash dates are month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y", "%d-%m-%Y", "%Y%m%d", "%d %b %Y",
    "%b %d %Y", "%d %B %Y", "%B %d %Y",
];

/// Year-month layouts; parsed as the first day of the month.
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%b %Y", "%B %Y"];

/// Parse a cell into a UTC timestamp. Naive values are taken as UTC.
pub fn parse_timestamp(cell: &Cell) -> Option<DateTime<Utc>> {
    match cell {
        Cell::DateTime(dt) => Some(dt.and_utc()),
        Cell::Text(s) => parse_text(s.trim()),
        Cell::Number(v) => whole_year(*v),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    // Year-month before day layouts: "Mar 2021" would otherwise read as day 20 of year 21
    for fmt in MONTH_FORMATS {
        let padded = format!("{} 01", s);
        let layout = format!("{} %d", fmt);
        if let Ok(date) = NaiveDate::parse_from_str(&padded, &layout) {
            return Some(midnight(date));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(midnight(date));
        }
    }

    s.parse::<f64>().ok().and_then(whole_year)
}

/// A bare four-digit year is read as January 1st of that year.
fn whole_year(v: f64) -> Option<DateTime<Utc>> {
    if v.fract() != 0.0 || !(1000.0..=9999.0).contains(&v) {
        return None;
    }
    NaiveDate::from_ymd_opt(v as i32, 1, 1).map(midnight)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
