//! Conditional-sum-of-squares estimation shared by ARIMA and SARIMA.
//!
//! Both models reduce to an ARMA recursion on the differenced series with
//! expanded lag polynomials:
//! `w_t - μ = Σ a_i (w_{t-i} - μ) + Σ b_j e_{t-j} + e_t`.
//!
//! The mean `μ` is only estimated when no differencing was applied; a
//! differenced series is modelled without a constant, so forecasts carry no
//! drift term.

use crate::error::{ExplorerError, Result};
use crate::models::arima::diff::integrate;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Bound on every AR/MA coefficient during optimisation.
pub(crate) const COEFFICIENT_BOUND: f64 = 0.99;

/// A fitted ARMA recursion together with what is needed to undo differencing.
#[derive(Debug, Clone)]
pub(crate) struct ArmaFit {
    /// Estimated mean of an undifferenced series, zero once differenced.
    pub intercept: f64,
    /// Optimised ARMA parameters (without the intercept), in model order.
    pub params: Vec<f64>,
    ar: Vec<f64>,
    ma: Vec<f64>,
    history: Vec<f64>,
    differenced: Vec<f64>,
    delta: Vec<f64>,
    innovations: Vec<f64>,
    /// One-step-ahead predictions on the original scale.
    pub fitted: Vec<f64>,
    /// `history - fitted`.
    pub residuals: Vec<f64>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub nobs: usize,
    pub iterations: usize,
}

/// Estimate the ARMA parameters of `differenced` by CSS.
///
/// `expand` maps a parameter vector to `(ar, ma)` lag polynomials; their
/// lengths must not depend on the parameter values. `delta` is the
/// differencing polynomial that produced `differenced` from `history`.
pub(crate) fn fit_css<E>(
    model: &str,
    history: &[f64],
    differenced: Vec<f64>,
    delta: Vec<f64>,
    initial: Vec<f64>,
    expand: E,
) -> Result<ArmaFit>
where
    E: Fn(&[f64]) -> (Vec<f64>, Vec<f64>),
{
    let n_arma = initial.len();
    let start = expand(&initial).0.len();
    let include_mean = delta.len() == 1;
    let offset = usize::from(include_mean);
    let k = n_arma + offset;

    // Every parameter needs at least one residual degree of freedom
    let needed_w = start + k + 1;
    if differenced.len() < needed_w {
        return Err(ExplorerError::InsufficientData {
            needed: history.len() - differenced.len() + needed_w,
            got: history.len(),
        });
    }

    let mean = if include_mean {
        differenced.iter().sum::<f64>() / differenced.len() as f64
    } else {
        0.0
    };
    let split = |point: &[f64]| -> (f64, Vec<f64>) {
        if include_mean {
            (point[0], point[1..].to_vec())
        } else {
            (0.0, point.to_vec())
        }
    };

    let objective = |point: &[f64]| {
        let (intercept, params) = split(point);
        let (ar, ma) = expand(&params);
        recursion(&differenced, &ar, &ma, intercept, start).2
    };

    let (point, iterations) = if n_arma == 0 {
        (if include_mean { vec![mean] } else { vec![] }, 0)
    } else {
        let mut start_point = Vec::with_capacity(k);
        if include_mean {
            start_point.push(mean);
        }
        start_point.extend(initial);

        let mut bounds = Vec::with_capacity(k);
        if include_mean {
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        bounds.extend(std::iter::repeat((-COEFFICIENT_BOUND, COEFFICIENT_BOUND)).take(n_arma));

        let mut result = nelder_mead(
            &objective,
            &start_point,
            Some(&bounds),
            NelderMeadConfig::for_dimension(k),
        );
        let mut iterations = result.iterations;

        if !result.converged {
            warn!(model, iterations, "optimiser budget exhausted, restarting from best point");
            let restart = result.optimal_point.clone();
            result = nelder_mead(
                &objective,
                &restart,
                Some(&bounds),
                NelderMeadConfig::for_dimension(k),
            );
            iterations += result.iterations;
        }

        if !result.converged {
            return Err(ExplorerError::Convergence {
                model: model.to_string(),
                reason: format!("optimiser did not converge after {} iterations", iterations),
            });
        }
        if !result.optimal_value.is_finite() {
            return Err(ExplorerError::Convergence {
                model: model.to_string(),
                reason: "conditional sum of squares is not finite".to_string(),
            });
        }
        (result.optimal_point, iterations)
    };

    let (intercept, params) = split(&point);
    let (ar, ma) = expand(&params);
    let (fitted_w, innovations, css) = recursion(&differenced, &ar, &ma, intercept, start);

    let nobs = differenced.len() - start;
    let sigma2 = css / nobs as f64;
    if !sigma2.is_finite() {
        return Err(ExplorerError::Convergence {
            model: model.to_string(),
            reason: "innovation variance is not finite".to_string(),
        });
    }

    let n_eff = nobs as f64;
    let log_likelihood = -0.5 * n_eff * (1.0 + sigma2.ln() + (2.0 * PI).ln());
    let aic = -2.0 * log_likelihood + 2.0 * k as f64;
    let bic = -2.0 * log_likelihood + k as f64 * n_eff.ln();

    // Map predictions back to the original scale
    let order = delta.len() - 1;
    let mut fitted = vec![f64::NAN; history.len()];
    let mut residuals = vec![f64::NAN; history.len()];
    for i in start..differenced.len() {
        let t = i + order;
        let carried: f64 = delta
            .iter()
            .enumerate()
            .skip(1)
            .map(|(j, c)| c * history[t - j])
            .sum();
        fitted[t] = fitted_w[i] - carried;
        residuals[t] = history[t] - fitted[t];
    }

    debug!(model, iterations, include_mean, sigma2, aic, nobs, "CSS fit complete");

    Ok(ArmaFit {
        intercept,
        params,
        ar,
        ma,
        history: history.to_vec(),
        differenced,
        delta,
        innovations,
        fitted,
        residuals,
        sigma2,
        log_likelihood,
        aic,
        bic,
        nobs,
        iterations,
    })
}

impl ArmaFit {
    /// Forecast `horizon` steps on the original scale.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        let mut w = self.differenced.clone();
        let mut e = self.innovations.clone();

        for _ in 0..horizon {
            let t = w.len();
            let mut pred = self.intercept;
            for (i, a) in self.ar.iter().enumerate() {
                if t > i {
                    pred += a * (w[t - 1 - i] - self.intercept);
                }
            }
            for (j, b) in self.ma.iter().enumerate() {
                if t > j {
                    pred += b * e[t - 1 - j];
                }
            }
            w.push(pred);
            e.push(0.0);
        }

        integrate(&w[self.differenced.len()..], &self.history, &self.delta)
    }
}

/// Run the ARMA recursion from `start`, with innovations before `start`
/// taken as zero. Returns `(fitted, innovations, css)` on the differenced scale.
fn recursion(w: &[f64], ar: &[f64], ma: &[f64], intercept: f64, start: usize) -> (Vec<f64>, Vec<f64>, f64) {
    let n = w.len();
    let mut fitted = vec![f64::NAN; n];
    let mut innovations = vec![0.0; n];
    let mut css = 0.0;

    for t in start..n {
        let mut pred = intercept;
        for (i, a) in ar.iter().enumerate() {
            pred += a * (w[t - 1 - i] - intercept);
        }
        for (j, b) in ma.iter().enumerate() {
            if t > j {
                pred += b * innovations[t - 1 - j];
            }
        }
        fitted[t] = pred;
        innovations[t] = w[t] - pred;
        css += innovations[t] * innovations[t];
    }

    if !css.is_finite() {
        css = f64::INFINITY;
    }
    (fitted, innovations, css)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::arima::diff::differencing_polynomial;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn plain(params: &[f64]) -> (Vec<f64>, Vec<f64>) {
        (params[..1].to_vec(), vec![])
    }

    #[test]
    fn recursion_matches_hand_computation() {
        let w = [1.0, 2.0, 0.0, 1.0];
        let (fitted, innovations, css) = recursion(&w, &[0.5], &[0.2], 1.0, 1);
        // t=1: 1 + 0.5*0 + 0.2*0 = 1   -> e=1
        // t=2: 1 + 0.5*1 + 0.2*1 = 1.7 -> e=-1.7
        // t=3: 1 + 0.5*-1 + 0.2*-1.7 = 0.16 -> e=0.84
        assert!(fitted[0].is_nan());
        assert_relative_eq!(fitted[2], 1.7, epsilon = 1e-12);
        assert_relative_eq!(innovations[3], 0.84, epsilon = 1e-12);
        assert_relative_eq!(css, 1.0 + 2.89 + 0.7056, epsilon = 1e-12);
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut values = vec![0.0];
        for i in 1..300 {
            let shock = rng.gen::<f64>() - 0.5;
            values.push(0.6 * values[i - 1] + shock);
        }

        let fit = fit_css("ARIMA(1,0,0)", &values, values.clone(), vec![1.0], vec![0.1], plain).unwrap();
        assert_relative_eq!(fit.params[0], 0.6, epsilon = 0.1);
        assert_eq!(fit.nobs, 299);
    }

    #[test]
    fn fitted_and_residuals_live_on_original_scale() {
        let history: Vec<f64> = (0..40).map(|i| 5.0 + 2.0 * i as f64 + (i as f64).sin()).collect();
        let delta = differencing_polynomial(1, 0, 1);
        let w: Vec<f64> = history.windows(2).map(|p| p[1] - p[0]).collect();

        let fit = fit_css("ARIMA(1,1,0)", &history, w, delta, vec![0.1], plain).unwrap();
        assert!(fit.fitted[0].is_nan());
        assert!(fit.fitted[1].is_nan());
        for t in 2..40 {
            assert_relative_eq!(history[t] - fit.fitted[t], fit.residuals[t], epsilon = 1e-12);
        }
    }

    #[test]
    fn mean_only_model_skips_the_optimiser() {
        let history = vec![1.0, 3.0, 2.0, 4.0, 3.0, 5.0];
        let fit = fit_css(
            "ARIMA(0,0,0)",
            &history,
            history.clone(),
            vec![1.0],
            vec![],
            |_| (vec![], vec![]),
        )
        .unwrap();
        assert_eq!(fit.iterations, 0);
        assert_relative_eq!(fit.intercept, 3.0, epsilon = 1e-12);
        assert_eq!(fit.forecast(3), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn random_walk_forecast_stays_at_the_last_value() {
        let history: Vec<f64> = (0..30).map(|i| 10.0 + 2.0 * i as f64).collect();
        let delta = differencing_polynomial(1, 0, 1);
        let w: Vec<f64> = history.windows(2).map(|p| p[1] - p[0]).collect();

        let fit = fit_css("ARIMA(0,1,0)", &history, w, delta, vec![], |_| (vec![], vec![])).unwrap();
        assert_eq!(fit.intercept, 0.0);
        assert_eq!(fit.iterations, 0);
        assert_eq!(fit.forecast(3), vec![68.0, 68.0, 68.0]);
    }

    #[test]
    fn differenced_fit_estimates_no_constant() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut level = 0.0;
        let history: Vec<f64> = (0..120)
            .map(|_| {
                level += 1.5 + rng.gen_range(-0.5..0.5);
                level
            })
            .collect();
        let delta = differencing_polynomial(1, 0, 1);
        let w: Vec<f64> = history.windows(2).map(|p| p[1] - p[0]).collect();

        let fit = fit_css("ARIMA(1,1,0)", &history, w, delta, vec![0.1], plain).unwrap();
        assert_eq!(fit.intercept, 0.0);
        assert_eq!(fit.params.len(), 1);
        assert!(fit.params[0].abs() <= COEFFICIENT_BOUND);
        // Only the AR coefficient counts towards the information criteria
        assert_relative_eq!(fit.aic + 2.0 * fit.log_likelihood, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn seasonal_start_index_skips_the_expanded_ar_lags() {
        let history: Vec<f64> = (0..40).map(|i| ((i % 4) as f64) + 0.1 * (i as f64).cos()).collect();
        // One seasonal AR coefficient at lag 4 expands to an AR polynomial of length 4
        let seasonal_ar = |p: &[f64]| (vec![0.0, 0.0, 0.0, p[0]], vec![]);

        let fit = fit_css("SARIMA(0,0,0)(1,0,0)[4]", &history, history.clone(), vec![1.0], vec![0.1], seasonal_ar)
            .unwrap();
        assert_eq!(fit.nobs, 36);
        assert!(fit.fitted[..4].iter().all(|v| v.is_nan()));
        assert!(fit.fitted[4..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn too_short_differenced_series_is_insufficient() {
        let history = vec![1.0, 2.0, 3.0, 4.0];
        let w = vec![1.0, 1.0, 1.0];
        let result = fit_css(
            "ARIMA(2,1,0)",
            &history,
            w,
            differencing_polynomial(1, 0, 1),
            vec![0.1, 0.1],
            |p| (p.to_vec(), vec![]),
        );
        assert!(matches!(result, Err(ExplorerError::InsufficientData { .. })));
    }
}
