//! Model order specification.

use crate::error::{ExplorerError, Result};
use std::fmt;
use std::ops::RangeInclusive;

/// Allowed AR/MA orders (`p`, `q`, `P`, `Q`).
pub const ORDER_RANGE: RangeInclusive<usize> = 0..=5;
/// Allowed differencing orders (`d`, `D`).
pub const DIFFERENCING_RANGE: RangeInclusive<usize> = 0..=2;
/// Allowed seasonal periods (`s`).
pub const SEASONAL_PERIOD_RANGE: RangeInclusive<usize> = 2..=24;

/// Which autoregressive model to fit, with its orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSpec {
    /// ARIMA(p, d, q).
    NonSeasonal { p: usize, d: usize, q: usize },
    /// SARIMA(p, d, q)(P, D, Q)[s].
    Seasonal {
        p: usize,
        d: usize,
        q: usize,
        seasonal_p: usize,
        seasonal_d: usize,
        seasonal_q: usize,
        period: usize,
    },
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self::NonSeasonal { p: 1, d: 1, q: 1 }
    }
}

impl ModelSpec {
    /// ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::NonSeasonal { p, d, q }
    }

    /// SARIMA(p, d, q)(P, D, Q)[s].
    pub fn sarima(
        (p, d, q): (usize, usize, usize),
        (seasonal_p, seasonal_d, seasonal_q): (usize, usize, usize),
        period: usize,
    ) -> Self {
        Self::Seasonal {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
        }
    }

    /// Whether this specification has a seasonal part.
    pub fn is_seasonal(&self) -> bool {
        matches!(self, Self::Seasonal { .. })
    }

    /// Check every order against its bound.
    pub fn validate(&self) -> Result<()> {
        let (p, d, q) = self.order();
        check("p", p, &ORDER_RANGE)?;
        check("d", d, &DIFFERENCING_RANGE)?;
        check("q", q, &ORDER_RANGE)?;

        if let Self::Seasonal {
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
            ..
        } = *self
        {
            check("P", seasonal_p, &ORDER_RANGE)?;
            check("D", seasonal_d, &DIFFERENCING_RANGE)?;
            check("Q", seasonal_q, &ORDER_RANGE)?;
            check("s", period, &SEASONAL_PERIOD_RANGE)?;
        }
        Ok(())
    }

    /// Non-seasonal `(p, d, q)`.
    pub fn order(&self) -> (usize, usize, usize) {
        match *self {
            Self::NonSeasonal { p, d, q } | Self::Seasonal { p, d, q, .. } => (p, d, q),
        }
    }
}

fn check(name: &str, value: usize, range: &RangeInclusive<usize>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ExplorerError::InvalidParameter(format!(
            "{} must be in {}..={}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NonSeasonal { p, d, q } => write!(f, "ARIMA({},{},{})", p, d, q),
            Self::Seasonal {
                p,
                d,
                q,
                seasonal_p,
                seasonal_d,
                seasonal_q,
                period,
            } => write!(
                f,
                "SARIMA({},{},{})({},{},{})[{}]",
                p, d, q, seasonal_p, seasonal_d, seasonal_q, period
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_arima_111() {
        assert_eq!(ModelSpec::default(), ModelSpec::arima(1, 1, 1));
        assert_eq!(ModelSpec::default().to_string(), "ARIMA(1,1,1)");
    }

    #[test]
    fn seasonal_label() {
        let spec = ModelSpec::sarima((1, 1, 1), (1, 1, 1), 12);
        assert!(spec.is_seasonal());
        assert_eq!(spec.to_string(), "SARIMA(1,1,1)(1,1,1)[12]");
        assert_eq!(spec.order(), (1, 1, 1));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(ModelSpec::arima(5, 2, 5).validate().is_ok());
        assert!(ModelSpec::arima(0, 0, 0).validate().is_ok());
        assert!(ModelSpec::sarima((0, 0, 0), (5, 2, 5), 24).validate().is_ok());
        assert!(ModelSpec::sarima((0, 0, 0), (0, 0, 0), 2).validate().is_ok());
    }

    #[test]
    fn out_of_range_orders_are_rejected() {
        for spec in [
            ModelSpec::arima(6, 1, 1),
            ModelSpec::arima(1, 3, 1),
            ModelSpec::arima(1, 1, 6),
            ModelSpec::sarima((1, 1, 1), (6, 0, 0), 12),
            ModelSpec::sarima((1, 1, 1), (0, 3, 0), 12),
            ModelSpec::sarima((1, 1, 1), (0, 0, 6), 12),
            ModelSpec::sarima((1, 1, 1), (1, 1, 1), 1),
            ModelSpec::sarima((1, 1, 1), (1, 1, 1), 25),
        ] {
            assert!(
                matches!(spec.validate(), Err(ExplorerError::InvalidParameter(_))),
                "{} should be rejected",
                spec
            );
        }
    }
}
