//! Ordinary least squares with coefficient standard errors.
//!
//! Used by the augmented Dickey-Fuller regression.

use crate::error::{ExplorerError, Result};

/// A fitted linear regression `y = X @ beta + e`.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Estimated coefficients, one per design column.
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OLSResult {
    /// t-statistic of coefficient `i`.
    pub fn t_stat(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit OLS on design columns (no implicit intercept; pass a column of ones).
///
/// Solves the normal equations with a Cholesky factorisation of `X'X`; the
/// same factor yields `(X'X)^-1` for the standard errors.
pub fn ols_fit(y: &[f64], columns: &[Vec<f64>]) -> Result<OLSResult> {
    let n = y.len();
    let k = columns.len();

    if k == 0 {
        return Err(ExplorerError::InvalidParameter(
            "regression needs at least one column".into(),
        ));
    }
    if n <= k {
        return Err(ExplorerError::InsufficientData { needed: k + 1, got: n });
    }
    if let Some(bad) = columns.iter().find(|c| c.len() != n) {
        return Err(ExplorerError::InvalidParameter(format!(
            "design column has {} rows, expected {}",
            bad.len(),
            n
        )));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in 0..=i {
            let s: f64 = columns[i].iter().zip(&columns[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
        xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum();
    }

    let factor = cholesky(&xtx).ok_or_else(|| {
        ExplorerError::Computation("regression design matrix is singular".into())
    })?;
    let coefficients = cholesky_solve(&factor, &xty);

    let ssr: f64 = (0..n)
        .map(|t| {
            let fitted: f64 = (0..k).map(|j| columns[j][t] * coefficients[j]).sum();
            (y[t] - fitted).powi(2)
        })
        .sum();
    let sigma2 = ssr / (n - k) as f64;

    let std_errors = (0..k)
        .map(|j| {
            let mut unit = vec![0.0; k];
            unit[j] = 1.0;
            let column = cholesky_solve(&factor, &unit);
            (sigma2 * column[j]).max(0.0).sqrt()
        })
        .collect();

    Ok(OLSResult {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}

/// Lower-triangular `L` with `A = L L'`, or `None` when `A` is not positive definite.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if !(sum > 1e-12 * scale.max(1.0)) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Solve `L L' x = b` by forward then backward substitution.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[i][j] * y[j]).sum();
        y[i] = (b[i] - sum) / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[j][i] * x[j]).sum();
        x[i] = (y[i] - sum) / l[i][i];
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exact_line_is_recovered() {
        // y = 2 + 3x
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();

        let fit = ols_fit(&y, &[vec![1.0; 5], x]).unwrap();
        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[1], 3.0, epsilon = 1e-9);
        assert!(fit.ssr < 1e-12);
    }

    #[test]
    fn standard_errors_match_closed_form() {
        // Simple regression: se(slope) = sqrt(s^2 / Sxx)
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![5.1, 7.9, 11.2, 13.8, 17.0];
        let fit = ols_fit(&y, &[vec![1.0; 5], x.clone()]).unwrap();

        let sxx: f64 = x.iter().map(|v| (v - 3.0).powi(2)).sum();
        let s2 = fit.ssr / 3.0;
        assert_relative_eq!(fit.std_errors[1], (s2 / sxx).sqrt(), epsilon = 1e-9);
        assert_relative_eq!(fit.t_stat(1), fit.coefficients[1] / fit.std_errors[1]);
    }

    #[test]
    fn information_criterion_penalises_columns() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let fit = ols_fit(&y, &[vec![1.0; 6], x]).unwrap();
        assert_relative_eq!(fit.aic(), -2.0 * fit.log_likelihood() + 4.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_design_is_a_computation_error() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let twice: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        assert!(matches!(
            ols_fit(&[1.0, 2.0, 3.0, 5.0], &[x, twice]),
            Err(ExplorerError::Computation(_))
        ));
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        assert_eq!(
            ols_fit(&[1.0, 2.0], &[vec![1.0, 1.0], vec![0.0, 1.0]]).unwrap_err(),
            ExplorerError::InsufficientData { needed: 3, got: 2 }
        );
    }

    #[test]
    fn ragged_design_is_rejected() {
        assert!(matches!(
            ols_fit(&[1.0, 2.0, 3.0], &[vec![1.0, 1.0]]),
            Err(ExplorerError::InvalidParameter(_))
        ));
    }
}
