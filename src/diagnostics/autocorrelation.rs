//! Sample ACF and PACF.

use crate::error::{ExplorerError, Result};
use crate::utils::stats::{autocovariances, quantile_normal};

/// Autocorrelation and partial autocorrelation up to a lag bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlogram {
    /// ACF indexed by lag `0..=max_lag`.
    pub acf: Vec<f64>,
    /// PACF indexed by lag `0..=max_lag`.
    pub pacf: Vec<f64>,
    /// Half-width of the 95% white-noise band, `1.96 / √n`.
    pub confidence_band: f64,
    /// Observations used.
    pub nobs: usize,
}

impl Correlogram {
    /// Largest lag computed.
    pub fn max_lag(&self) -> usize {
        self.acf.len() - 1
    }

    /// Lags `>= 1` whose ACF falls outside the white-noise band.
    pub fn significant_acf_lags(&self) -> Vec<usize> {
        outside_band(&self.acf, self.confidence_band)
    }

    /// Lags `>= 1` whose PACF falls outside the white-noise band.
    pub fn significant_pacf_lags(&self) -> Vec<usize> {
        outside_band(&self.pacf, self.confidence_band)
    }
}

fn outside_band(values: &[f64], band: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, v)| v.abs() > band)
        .map(|(lag, _)| lag)
        .collect()
}

/// Compute ACF and PACF for lags `0..=max_lag`.
///
/// Both come from the biased (denominator `n`) autocovariance; the PACF is
/// the Yule-Walker solution obtained by Durbin-Levinson recursion. A series
/// with zero variance has undefined correlations: lag 0 is `1.0` and every
/// other lag is `NaN`.
///
/// # Example
/// ```
/// use ts_explorer::diagnostics::correlogram;
///
/// let values: Vec<f64> = (0..50).map(|i| (i as f64 * 0.7).sin()).collect();
/// let c = correlogram(&values, 10).unwrap();
/// assert_eq!(c.acf.len(), 11);
/// assert_eq!(c.acf[0], 1.0);
/// ```
pub fn correlogram(values: &[f64], max_lag: usize) -> Result<Correlogram> {
    let n = values.len();
    if max_lag >= n {
        return Err(ExplorerError::InsufficientData {
            needed: max_lag + 1,
            got: n,
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ExplorerError::InvalidParameter(
            "correlogram input must not contain missing values".to_string(),
        ));
    }

    let confidence_band = quantile_normal(0.975) / (n as f64).sqrt();
    let acov = autocovariances(values, max_lag);
    let scale = values.iter().map(|v| v.abs()).fold(0.0, f64::max).max(1.0);

    if acov[0] <= 1e-20 * scale * scale {
        let mut undefined = vec![f64::NAN; max_lag + 1];
        undefined[0] = 1.0;
        return Ok(Correlogram {
            acf: undefined.clone(),
            pacf: undefined,
            confidence_band,
            nobs: n,
        });
    }

    let acf: Vec<f64> = acov.iter().map(|c| c / acov[0]).collect();
    let pacf = durbin_levinson(&acf);

    Ok(Correlogram {
        acf,
        pacf,
        confidence_band,
        nobs: n,
    })
}

/// Partial autocorrelations `φ_kk` from an autocorrelation sequence.
///
/// Once the prediction-error variance vanishes the remaining lags are `NaN`.
fn durbin_levinson(acf: &[f64]) -> Vec<f64> {
    let max_lag = acf.len() - 1;
    let mut pacf = vec![f64::NAN; max_lag + 1];
    pacf[0] = 1.0;

    let mut phi: Vec<f64> = Vec::with_capacity(max_lag);
    let mut error_variance = 1.0_f64;

    for k in 1..=max_lag {
        let num = acf[k] - phi.iter().enumerate().map(|(j, p)| p * acf[k - 1 - j]).sum::<f64>();
        if error_variance.abs() < 1e-12 {
            break;
        }
        let kappa = num / error_variance;

        let mut next: Vec<f64> = phi
            .iter()
            .enumerate()
            .map(|(j, p)| p - kappa * phi[phi.len() - 1 - j])
            .collect();
        next.push(kappa);

        phi = next;
        error_variance *= 1.0 - kappa * kappa;
        pacf[k] = kappa;
    }

    pacf
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut values = Vec::with_capacity(n);
        let mut prev = 0.0;
        for _ in 0..n {
            prev = phi * prev + (rng.gen::<f64>() - 0.5);
            values.push(prev);
        }
        values
    }

    #[test]
    fn lengths_and_lag_zero() {
        let c = correlogram(&ar1(0.5, 100, 1), 20).unwrap();
        assert_eq!(c.acf.len(), 21);
        assert_eq!(c.pacf.len(), 21);
        assert_eq!(c.acf[0], 1.0);
        assert_eq!(c.pacf[0], 1.0);
        assert_eq!(c.max_lag(), 20);
    }

    #[test]
    fn pacf_lag_one_equals_acf_lag_one() {
        let c = correlogram(&ar1(0.6, 200, 2), 5).unwrap();
        assert_relative_eq!(c.pacf[1], c.acf[1], epsilon = 1e-12);
    }

    #[test]
    fn ar1_pacf_cuts_off_after_lag_one() {
        let c = correlogram(&ar1(0.8, 2000, 3), 10).unwrap();
        assert!(c.pacf[1] > 0.7);
        for lag in 2..=10 {
            assert!(c.pacf[lag].abs() < 0.1, "pacf[{}] = {}", lag, c.pacf[lag]);
        }
        assert_eq!(c.significant_pacf_lags().first(), Some(&1));
    }

    #[test]
    fn known_acf_of_short_sequence() {
        let c = correlogram(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_relative_eq!(c.acf[1], 0.25, epsilon = 1e-12);
        assert_relative_eq!(c.acf[2], -0.3, epsilon = 1e-12);
        // φ22 = (ρ2 - ρ1²) / (1 - ρ1²)
        assert_relative_eq!(c.pacf[2], (-0.3 - 0.0625) / (1.0 - 0.0625), epsilon = 1e-12);
    }

    #[test]
    fn constant_series_has_undefined_lags() {
        let c = correlogram(&[4.0; 30], 10).unwrap();
        assert_eq!(c.acf[0], 1.0);
        assert_eq!(c.pacf[0], 1.0);
        assert!(c.acf[1..].iter().all(|v| v.is_nan()));
        assert!(c.pacf[1..].iter().all(|v| v.is_nan()));
        assert!(c.significant_acf_lags().is_empty());
    }

    #[test]
    fn max_lag_must_be_below_length() {
        assert_eq!(
            correlogram(&[1.0, 2.0, 3.0], 3).unwrap_err(),
            ExplorerError::InsufficientData { needed: 4, got: 3 }
        );
        assert!(correlogram(&[1.0, 2.0, 3.0], 2).is_ok());
    }

    #[test]
    fn band_is_196_over_root_n() {
        let c = correlogram(&ar1(0.1, 100, 4), 10).unwrap();
        assert_relative_eq!(c.confidence_band, 0.196, epsilon = 1e-3);
    }

    #[test]
    fn acf_is_bounded() {
        let c = correlogram(&ar1(-0.4, 300, 5), 40).unwrap();
        for v in c.acf.iter().chain(c.pacf.iter()) {
            assert!(v.abs() <= 1.0 + 1e-9);
        }
    }
}
