//! Lag polynomials.
//!
//! A polynomial in the lag operator `L` is stored as its coefficient vector,
//! index = power of `L`:
//!
//! ```text
//! [1.0, -0.5, 0.0, 0.2]  ==  1 - 0.5 L + 0.2 L^3
//! ```
//!
//! Seasonal models multiply a non-seasonal and a seasonal polynomial, and the
//! differencing operator `(1 - L)^d (1 - L^s)^D` is built the same way.

/// Multiply two lag polynomials.
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0.0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// `1 - c_1 L^step - c_2 L^{2 step} - ...` (autoregressive sign convention).
pub fn ar_lag_poly(coeffs: &[f64], step: usize) -> Vec<f64> {
    let mut out = vec![0.0; coeffs.len() * step + 1];
    out[0] = 1.0;
    for (i, &c) in coeffs.iter().enumerate() {
        out[(i + 1) * step] = -c;
    }
    out
}

/// `1 + c_1 L^step + c_2 L^{2 step} + ...` (moving-average sign convention).
pub fn ma_lag_poly(coeffs: &[f64], step: usize) -> Vec<f64> {
    let mut out = vec![0.0; coeffs.len() * step + 1];
    out[0] = 1.0;
    for (i, &c) in coeffs.iter().enumerate() {
        out[(i + 1) * step] = c;
    }
    out
}

/// `(1 - L)^d (1 - L^s)^D`.
pub fn differencing_poly(d: usize, seasonal_d: usize, s: usize) -> Vec<f64> {
    let mut out = vec![1.0];
    for _ in 0..d {
        out = poly_mul(&out, &[1.0, -1.0]);
    }
    if s > 0 {
        let mut seasonal = vec![0.0; s + 1];
        seasonal[0] = 1.0;
        seasonal[s] = -1.0;
        for _ in 0..seasonal_d {
            out = poly_mul(&out, &seasonal);
        }
    }
    out
}

/// Apply a differencing polynomial: `w_t = Σ_k poly[k] y_{t-k}`.
///
/// The first `poly.len() - 1` observations are consumed.
pub fn apply_difference(y: &[f64], poly: &[f64]) -> Vec<f64> {
    let lag = poly.len().saturating_sub(1);
    if y.len() <= lag {
        return Vec::new();
    }
    (lag..y.len())
        .map(|t| poly.iter().enumerate().map(|(k, &c)| c * y[t - k]).sum())
        .collect()
}

/// Invert [`apply_difference`] for values following `history`.
///
/// Given the undifferenced `history` and differenced continuations `w`,
/// reconstructs `y_t = w_t - Σ_{k≥1} poly[k] y_{t-k}`.
///
/// `history` must hold at least `poly.len() - 1` values.
pub fn integrate(history: &[f64], w: &[f64], poly: &[f64]) -> Vec<f64> {
    let lag = poly.len().saturating_sub(1);
    let mut level: Vec<f64> = history[history.len().saturating_sub(lag)..].to_vec();
    let start = level.len();
    for &wt in w {
        let t = level.len();
        let mut yt = wt;
        for k in 1..=lag {
            yt -= poly[k] * level[t - k];
        }
        level.push(yt);
    }
    level.split_off(start)
}
