//! Differencing and its inverse for ARIMA/SARIMA models.

/// Apply regular differencing `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return vec![];
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing at lag `period`, `d` times.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    if period == 0 {
        return result;
    }
    for _ in 0..d {
        if result.len() <= period {
            return vec![];
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Coefficients of `(1 - B)^d (1 - B^s)^D`, lowest lag first.
///
/// Entry `k` multiplies `y_{t-k}`; entry 0 is always 1. The length is
/// `d + D·s + 1`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &lag_difference(1));
    }
    for _ in 0..seasonal_d {
        poly = multiply(&poly, &lag_difference(period));
    }
    poly
}

/// Undo differencing for values that follow `history`.
///
/// With `w_t = Σ δ_k y_{t-k}` this is `y_t = w_t - Σ_{k≥1} δ_k y_{t-k}`,
/// applied one step at a time so each new level feeds the next.
pub fn integrate(differenced: &[f64], history: &[f64], delta: &[f64]) -> Vec<f64> {
    let mut levels = history.to_vec();
    for &w in differenced {
        let t = levels.len();
        let carried: f64 = delta
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| if t >= k { c * levels[t - k] } else { 0.0 })
            .sum();
        levels.push(w - carried);
    }
    levels.split_off(history.len())
}

/// `1 - B^lag`.
fn lag_difference(lag: usize) -> Vec<f64> {
    let mut poly = vec![0.0; lag + 1];
    poly[0] = 1.0;
    poly[lag] -= 1.0;
    poly
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}
