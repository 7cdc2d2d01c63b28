//! Sampling frequency inference and extrapolation.
//!
//! Calendar-month spacing (monthly, quarterly, yearly data) is not a fixed
//! number of seconds, so it is detected separately from fixed spacing.

use crate::error::{ExplorerError, Result};
use chrono::{DateTime, Datelike, Duration, Months, Utc};
use std::collections::HashMap;
use std::fmt;

/// Sampling frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// A whole number of calendar months (1 = monthly, 3 = quarterly, 12 = yearly).
    Months(u32),
    /// A fixed time span (hourly, daily, weekly, ...).
    Fixed(Duration),
}

impl Frequency {
    /// Infer the modal spacing of a sorted sequence of timestamps.
    ///
    /// `tolerance` is the minimum share of gaps that must agree with the
    /// modal spacing.
    pub fn infer(timestamps: &[DateTime<Utc>], tolerance: f64) -> Result<Self> {
        if timestamps.len() < 2 {
            return Err(ExplorerError::InsufficientData {
                needed: 2,
                got: timestamps.len(),
            });
        }

        let total = timestamps.len() - 1;

        // Calendar-month spacing
        let mut month_counts: HashMap<u32, usize> = HashMap::new();
        for w in timestamps.windows(2) {
            if let Some(step) = month_step(w[0], w[1]) {
                *month_counts.entry(step).or_insert(0) += 1;
            }
        }
        if let Some((step, count)) = modal(&month_counts) {
            if count as f64 / total as f64 >= tolerance {
                return Ok(Frequency::Months(step));
            }
        }

        // Fixed spacing
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        let (modal_diff, modal_count) = modal(&counts).ok_or(
            ExplorerError::FrequencyInference("empty spacing data".to_string()),
        )?;

        if (modal_count as f64 / total as f64) < tolerance {
            return Err(ExplorerError::FrequencyInference(
                "no unique modal spacing found".to_string(),
            ));
        }
        if modal_diff <= 0 {
            return Err(ExplorerError::FrequencyInference(
                "timestamps are not increasing".to_string(),
            ));
        }

        Ok(Frequency::Fixed(Duration::seconds(modal_diff)))
    }

    /// Timestamp `steps` periods after `from`.
    pub fn advance(&self, from: DateTime<Utc>, steps: u32) -> Result<DateTime<Utc>> {
        let overflow =
            || ExplorerError::Computation(format!("timestamp overflow advancing from {}", from));

        match *self {
            Frequency::Months(months) => {
                let total = months.checked_mul(steps).ok_or_else(overflow)?;
                if is_month_end(from) {
                    // Stay anchored to month ends: first of month + (n + 1) months - 1 day
                    let first = from.with_day(1).ok_or_else(overflow)?;
                    let next = first
                        .checked_add_months(Months::new(total + 1))
                        .ok_or_else(overflow)?;
                    Ok(next - Duration::days(1))
                } else {
                    from.checked_add_months(Months::new(total))
                        .ok_or_else(overflow)
                }
            }
            Frequency::Fixed(step) => {
                let offset = i32::try_from(steps)
                    .ok()
                    .and_then(|s| step.checked_mul(s))
                    .ok_or_else(overflow)?;
                from.checked_add_signed(offset).ok_or_else(overflow)
            }
        }
    }

    /// The `horizon` timestamps following `last`.
    pub fn extrapolate(&self, last: DateTime<Utc>, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        (1..=horizon)
            .map(|h| {
                let steps = u32::try_from(h).map_err(|_| {
                    ExplorerError::InvalidParameter(format!("horizon {} is too large", horizon))
                })?;
                self.advance(last, steps)
            })
            .collect()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Frequency::Months(1) => write!(f, "monthly"),
            Frequency::Months(3) => write!(f, "quarterly"),
            Frequency::Months(12) => write!(f, "yearly"),
            Frequency::Months(n) => write!(f, "every {} months", n),
            Frequency::Fixed(d) if d == Duration::hours(1) => write!(f, "hourly"),
            Frequency::Fixed(d) if d == Duration::days(1) => write!(f, "daily"),
            Frequency::Fixed(d) if d == Duration::weeks(1) => write!(f, "weekly"),
            Frequency::Fixed(d) => write!(f, "every {} seconds", d.num_seconds()),
        }
    }
}

/// Number of calendar months between two timestamps, if they are a whole
/// number of months apart on the same day (or both on a month end) and at
/// the same time of day.
fn month_step(a: DateTime<Utc>, b: DateTime<Utc>) -> Option<u32> {
    let months = (b.year() - a.year()) * 12 + b.month() as i32 - a.month() as i32;
    if months <= 0 || a.time() != b.time() {
        return None;
    }
    let aligned = a.day() == b.day() || (is_month_end(a) && is_month_end(b));
    if aligned {
        u32::try_from(months).ok()
    } else {
        None
    }
}

fn is_month_end(t: DateTime<Utc>) -> bool {
    (t + Duration::days(1)).month() != t.month()
}

/// Most common key; ties go to the smallest key so the result is deterministic.
fn modal<K: Copy + Ord>(counts: &HashMap<K, usize>) -> Option<(K, usize)> {
    counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| kb.cmp(ka)))
        .map(|(&k, &c)| (k, c))
}
