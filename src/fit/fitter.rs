//! Maximum likelihood estimation of a SARIMA specification.
//!
//! Given:
//! - a specification (orders, seasonal orders, trend)
//! - observed values `y_t`
//!
//! we:
//! - difference `y` into `w`
//! - derive starting values with a Hannan–Rissanen regression
//! - minimize the per-observation negative concentrated log-likelihood
//!   (Kalman filter) with Nelder–Mead
//!
//! and return the estimated coefficients plus likelihood diagnostics.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::AppError;
use crate::fit::optimizer::NelderMead;
use crate::math::{FilterOutput, apply_difference, least_squares};
use crate::models::{SarimaxParams, SarimaxSpec};

/// Bound on starting AR/MA coefficients.
const START_COEF_BOUND: f64 = 0.99;

/// Options that affect how a model is estimated.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    pub optimizer: NelderMead,
}

/// Estimated model.
#[derive(Debug, Clone)]
pub struct SarimaxFit {
    pub params: SarimaxParams,
    pub loglik: f64,
    /// Prediction errors entering the likelihood (after differencing and burn-in).
    pub nobs_effective: usize,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Fit `spec` to `y`.
pub fn fit_sarimax(spec: &SarimaxSpec, y: &[f64], opts: &FitOptions) -> Result<SarimaxFit, AppError> {
    if y.iter().any(|v| !v.is_finite()) {
        return Err(AppError::estimation("Series contains non-finite values."));
    }
    let needed = spec.min_observations();
    if y.len() < needed {
        return Err(AppError::estimation(format!(
            "Series has {} observations; {spec} needs at least {needed}.",
            y.len()
        )));
    }

    let w = apply_difference(y, &spec.diff_poly());
    let burn = spec.state_dim();

    let objective = |x: &[f64]| -> f64 {
        match evaluate(spec, &w, x, burn) {
            Some(out) => -out.loglik / out.nobs_effective as f64,
            None => f64::INFINITY,
        }
    };

    let mut x0 = start_params(spec, &w);
    if !objective(&x0).is_finite() {
        debug!("regression start values give a non-finite likelihood; using flat start");
        x0 = flat_start(spec, &w);
    }
    debug!(spec = %spec, start = ?x0, "starting likelihood search");

    let min = opts.optimizer.minimize(objective, &x0)?;
    debug!(
        iterations = min.iterations,
        evaluations = min.evaluations,
        objective = min.fx,
        "likelihood search converged"
    );

    let out = evaluate(spec, &w, &min.x, burn)
        .ok_or_else(|| AppError::estimation("Likelihood is not finite at the estimated parameters."))?;

    Ok(SarimaxFit {
        params: SarimaxParams::from_vec(spec, &min.x, out.sigma2),
        loglik: out.loglik,
        nobs_effective: out.nobs_effective,
        iterations: min.iterations,
        evaluations: min.evaluations,
    })
}

/// Run the filter over the differenced series `w` at parameter vector `x`.
pub fn evaluate(spec: &SarimaxSpec, w: &[f64], x: &[f64], burn: usize) -> Option<FilterOutput> {
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let params = SarimaxParams::from_vec(spec, x, 1.0);
    params
        .state_space(spec)
        .filter(w, |t| params.trend_at(t), burn)
}

/// Hannan–Rissanen starting values for the differenced series `w`.
///
/// 1. A long autoregression supplies residual estimates `ê_t` (only when the
///    model has MA terms).
/// 2. `w_t` is regressed on the trend columns, the AR lags of `w` and the MA
///    lags of `ê`.
///
/// Seasonal lags enter additively, so the result is an approximation for
/// multiplicative models. Falls back to [`flat_start`] when there is not enough
/// data or the regression is singular.
pub fn start_params(spec: &SarimaxSpec, w: &[f64]) -> Vec<f64> {
    let ar_lags = spec.ar_regressor_lags();
    let ma_lags = spec.ma_regressor_lags();
    let trend = spec.trend.unwrap_or(crate::domain::Trend::None);
    let n = w.len();

    let residuals = if ma_lags.is_empty() {
        None
    } else {
        let long = (spec.ar_lag() + spec.ma_lag()).max(1);
        match long_ar_residuals(w, long) {
            Some(e) => Some((long, e)),
            None => return flat_start(spec, w),
        }
    };

    let max_ar = ar_lags.iter().copied().max().unwrap_or(0);
    let max_ma = ma_lags.iter().copied().max().unwrap_or(0);
    let first = match &residuals {
        Some((long, _)) => max_ar.max(long + max_ma),
        None => max_ar,
    };
    let cols = spec.param_count();
    if cols == 0 {
        return Vec::new();
    }
    if n <= first || n - first <= cols {
        return flat_start(spec, w);
    }

    let rows = n - first;
    let mut x = DMatrix::<f64>::zeros(rows, cols);
    let mut y = DVector::<f64>::zeros(rows);
    for (i, t) in (first..n).enumerate() {
        let mut j = 0;
        if trend.has_constant() {
            x[(i, j)] = 1.0;
            j += 1;
        }
        if trend.has_linear() {
            x[(i, j)] = t as f64 + 1.0;
            j += 1;
        }
        for &lag in &ar_lags {
            x[(i, j)] = w[t - lag];
            j += 1;
        }
        if let Some((_, e)) = &residuals {
            for &lag in &ma_lags {
                x[(i, j)] = e[t - lag];
                j += 1;
            }
        }
        y[i] = w[t];
    }

    let Some(fit) = least_squares(&x, &y) else {
        return flat_start(spec, w);
    };

    let n_trend = trend.param_count();
    fit.beta
        .iter()
        .enumerate()
        .map(|(j, &b)| {
            if j < n_trend {
                b
            } else {
                b.clamp(-START_COEF_BOUND, START_COEF_BOUND)
            }
        })
        .collect()
}

/// Zero ARMA coefficients; the intercept (if any) starts at the mean of `w`.
pub fn flat_start(spec: &SarimaxSpec, w: &[f64]) -> Vec<f64> {
    let mut x = vec![0.0; spec.param_count()];
    let has_constant = spec.trend.is_some_and(|t| t.has_constant());
    if has_constant && !w.is_empty() {
        x[0] = w.iter().sum::<f64>() / w.len() as f64;
    }
    x
}

/// Residuals of an AR(`order`) regression with intercept, aligned with `w`.
///
/// The first `order` entries (no residual available) are zero.
fn long_ar_residuals(w: &[f64], order: usize) -> Option<Vec<f64>> {
    let n = w.len();
    let cols = order + 1;
    if n <= order || n - order <= cols {
        return None;
    }
    let rows = n - order;
    let mut x = DMatrix::<f64>::zeros(rows, cols);
    let mut y = DVector::<f64>::zeros(rows);
    for (i, t) in (order..n).enumerate() {
        x[(i, 0)] = 1.0;
        for lag in 1..=order {
            x[(i, lag)] = w[t - lag];
        }
        y[i] = w[t];
    }
    let fit = least_squares(&x, &y)?;

    let mut e = vec![0.0; n];
    e[order..].copy_from_slice(fit.residuals.as_slice());
    Some(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, SeasonalOrder, Trend};

    /// Deterministic standard normal draws (xorshift + Box–Muller).
    pub(crate) fn normal_draws(seed: u64, n: usize) -> Vec<f64> {
        let mut state = seed.max(1);
        let mut uniform = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ((state >> 11) as f64 + 0.5) / (1u64 << 53) as f64
        };
        (0..n)
            .map(|_| {
                let u1 = uniform();
                let u2 = uniform();
                (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
            })
            .collect()
    }

    fn ar1(phi: f64, c: f64, n: usize) -> Vec<f64> {
        let e = normal_draws(42, n + 50);
        let mut y = vec![c / (1.0 - phi)];
        for t in 1..n + 50 {
            y.push(c + phi * y[t - 1] + e[t]);
        }
        y.split_off(50)
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let y = ar1(0.6, 0.0, 600);
        let spec = SarimaxSpec::new(Order::new(1, 0, 0), SeasonalOrder::none(), None).unwrap();
        let fit = fit_sarimax(&spec, &y, &FitOptions::default()).unwrap();
        assert!((fit.params.ar[0] - 0.6).abs() < 0.1, "phi = {}", fit.params.ar[0]);
        assert!((fit.params.sigma2 - 1.0).abs() < 0.2, "sigma2 = {}", fit.params.sigma2);
        assert!(fit.loglik.is_finite());
    }

    #[test]
    fn recovers_intercept_of_white_noise() {
        let y: Vec<f64> = normal_draws(7, 400).iter().map(|e| 5.0 + e).collect();
        let spec = SarimaxSpec::new(Order::new(0, 0, 0), SeasonalOrder::none(), Some(Trend::Constant)).unwrap();
        let fit = fit_sarimax(&spec, &y, &FitOptions::default()).unwrap();
        assert!((fit.params.intercept.unwrap() - 5.0).abs() < 0.2);
    }

    #[test]
    fn hannan_rissanen_start_is_close_for_arma() {
        let e = normal_draws(3, 800);
        let mut w = vec![0.0];
        for t in 1..e.len() {
            w.push(0.5 * w[t - 1] + e[t] + 0.3 * e[t - 1]);
        }
        let spec = SarimaxSpec::new(Order::new(1, 0, 1), SeasonalOrder::none(), None).unwrap();
        let x0 = start_params(&spec, &w);
        assert_eq!(x0.len(), 2);
        assert!((x0[0] - 0.5).abs() < 0.2);
        assert!((x0[1] - 0.3).abs() < 0.2);
    }

    #[test]
    fn too_short_series_is_an_estimation_error() {
        let spec = SarimaxSpec::new(Order::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7), None).unwrap();
        let err = fit_sarimax(&spec, &[1.0; 10], &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Estimation);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let spec = SarimaxSpec::new(Order::new(1, 0, 0), SeasonalOrder::none(), None).unwrap();
        let y = [1.0, 2.0, f64::NAN, 3.0, 4.0, 5.0];
        assert!(fit_sarimax(&spec, &y, &FitOptions::default()).is_err());
    }

    #[test]
    fn short_series_falls_back_to_flat_start() {
        let spec = SarimaxSpec::new(Order::new(2, 0, 0), SeasonalOrder::none(), Some(Trend::Constant)).unwrap();
        let w = [1.0, 2.0, 3.0];
        assert_eq!(start_params(&spec, &w), vec![2.0, 0.0, 0.0]);
    }
}
