//! Bounded Nelder-Mead simplex minimisation, used for ARIMA/SARIMA fitting.

use std::cmp::Ordering;

/// Outcome of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// True when the simplex met the tolerance before `max_iter`.
    pub converged: bool,
}

/// Nelder-Mead settings.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Relative tolerance on the spread of objective values.
    pub tolerance: f64,
    /// Absolute tolerance on the distance of every vertex from the best one.
    pub x_tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Initial simplex step, relative to the coordinate when it is non-zero.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            x_tolerance: 1e-6,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

impl NelderMeadConfig {
    /// Defaults with an iteration budget scaled to the number of parameters.
    pub fn for_dimension(n_params: usize) -> Self {
        Self {
            max_iter: 500 * n_params.max(1),
            ..Self::default()
        }
    }
}

/// Minimise `objective` starting from `initial`, clamping every trial point
/// into `bounds` when given.
///
/// Convergence is declared once the spread between the worst and best vertex
/// falls below `tolerance * (1 + |best|)` and every vertex lies within
/// `x_tolerance` of the best one. Equal objective values alone are not enough:
/// a simplex straddling the minimum can tie while still far from it.
///
/// # Example
/// ```
/// use ts_explorer::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        let value = objective(initial);
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: value,
            iterations: 0,
            converged: value.is_finite(),
        };
    }

    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    let mut simplex = Simplex::around(initial, bounds, config.initial_step);
    let mut values: Vec<f64> = simplex.vertices.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let order = ranked(&values);
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let spread = values[worst] - values[best];
        let flat = spread.is_finite() && spread <= config.tolerance * (1.0 + values[best].abs());
        if flat && simplex.radius(best) <= config.x_tolerance {
            converged = true;
            break;
        }

        let centroid = simplex.centroid_without(worst);

        let reflected = clamp(&towards(&centroid, &simplex.vertices[worst], -config.alpha), bounds);
        let reflected_value = eval(&reflected);

        if reflected_value < values[best] {
            let expanded = clamp(&towards(&centroid, &reflected, config.gamma), bounds);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex.replace(worst, expanded, &mut values, expanded_value);
            } else {
                simplex.replace(worst, reflected, &mut values, reflected_value);
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex.replace(worst, reflected, &mut values, reflected_value);
            continue;
        }

        let (contracted, threshold) = if reflected_value < values[worst] {
            (towards(&centroid, &reflected, config.rho), reflected_value)
        } else {
            (towards(&centroid, &simplex.vertices[worst], config.rho), values[worst])
        };
        let contracted = clamp(&contracted, bounds);
        let contracted_value = eval(&contracted);
        if contracted_value < threshold {
            simplex.replace(worst, contracted, &mut values, contracted_value);
            continue;
        }

        simplex.shrink_towards(best, config.sigma, bounds);
        for (i, vertex) in simplex.vertices.iter().enumerate() {
            if i != best {
                values[i] = eval(vertex);
            }
        }
    }

    let best = ranked(&values)[0];
    NelderMeadResult {
        optimal_point: simplex.vertices[best].clone(),
        optimal_value: objective(&simplex.vertices[best]),
        iterations,
        converged,
    }
}

struct Simplex {
    vertices: Vec<Vec<f64>>,
}

impl Simplex {
    fn around(initial: &[f64], bounds: Option<&[(f64, f64)]>, step: f64) -> Self {
        let start = clamp(initial, bounds);
        let mut vertices = Vec::with_capacity(start.len() + 1);
        vertices.push(start.clone());

        for i in 0..start.len() {
            let mut vertex = start.clone();
            let delta = if start[i].abs() > 1e-10 {
                step * start[i].abs()
            } else {
                step
            };
            vertex[i] += delta;
            let mut clamped = clamp(&vertex, bounds);
            // Step back inward when the upper bound swallowed the move
            if clamped[i] == start[i] {
                vertex[i] = start[i] - delta;
                clamped = clamp(&vertex, bounds);
            }
            vertices.push(clamped);
        }

        Self { vertices }
    }

    fn centroid_without(&self, exclude: usize) -> Vec<f64> {
        let dim = self.vertices[0].len();
        let count = (self.vertices.len() - 1) as f64;
        let mut centroid = vec![0.0; dim];
        for (_, vertex) in self.vertices.iter().enumerate().filter(|(i, _)| *i != exclude) {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= count);
        centroid
    }

    fn radius(&self, anchor: usize) -> f64 {
        let centre = &self.vertices[anchor];
        self.vertices
            .iter()
            .map(|v| {
                v.iter()
                    .zip(centre)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max)
    }

    fn replace(&mut self, idx: usize, vertex: Vec<f64>, values: &mut [f64], value: f64) {
        self.vertices[idx] = vertex;
        values[idx] = value;
    }

    fn shrink_towards(&mut self, best: usize, sigma: f64, bounds: Option<&[(f64, f64)]>) {
        let anchor = self.vertices[best].clone();
        for (i, vertex) in self.vertices.iter_mut().enumerate() {
            if i == best {
                continue;
            }
            let shrunk = towards(&anchor, vertex, sigma);
            *vertex = clamp(&shrunk, bounds);
        }
    }
}

/// Indices sorted by ascending objective value.
fn ranked(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
    order
}

/// `from + t * (to - from)`.
fn towards(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(f, x)| f + t * (x - f)).collect()
}

fn clamp(point: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => point.to_vec(),
        Some(b) => point
            .iter()
            .enumerate()
            .map(|(i, &x)| match b.get(i) {
                Some(&(lo, hi)) => x.clamp(lo, hi),
                None => x,
            })
            .collect(),
    }
}
