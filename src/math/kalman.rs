//! Kalman filter for ARMA processes in Harvey state-space form.
//!
//! For an ARMA(p*, q*) process with a time-varying intercept `μ_t`
//!
//! ```text
//! w_t = μ_t + φ_1 w_{t-1} + ... + φ_p* w_{t-p*} + ε_t + θ_1 ε_{t-1} + ... + θ_q* ε_{t-q*}
//! ```
//!
//! the state vector has dimension `r = max(p*, q* + 1)` and
//!
//! ```text
//! α_{t+1} = T α_t + e_1 μ_{t+1} + R ε_{t+1}
//! w_t     = Z α_t                     (Z = e_1, no measurement noise)
//! ```
//!
//! with `T` the companion matrix of the AR coefficients and
//! `R = [1, θ_1, ..., θ_{r-1}]'`.
//!
//! The filter runs with unit innovation variance; `σ²` is concentrated out of
//! the likelihood afterwards. Initialization is approximate diffuse
//! (`P_0 = κ I`), and the first `burn` prediction errors are excluded from the
//! likelihood.

use nalgebra::{DMatrix, DVector};

/// Diffuse prior variance.
pub const DIFFUSE_KAPPA: f64 = 1e6;

/// ARMA process in state-space form.
#[derive(Debug, Clone)]
pub struct ArmaStateSpace {
    transition: DMatrix<f64>,
    state_cov: DMatrix<f64>,
    dim: usize,
}

/// Result of a filtering pass.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Concentrated Gaussian log-likelihood.
    pub loglik: f64,
    /// Concentrated innovation variance.
    pub sigma2: f64,
    /// Number of prediction errors entering the likelihood.
    pub nobs_effective: usize,
    /// Predicted state for the period after the last observation.
    pub next_state: DVector<f64>,
}

impl ArmaStateSpace {
    /// Build from reduced (already multiplied-out) AR and MA coefficients.
    ///
    /// `ar[i]` multiplies `w_{t-i-1}`, `ma[j]` multiplies `ε_{t-j-1}`.
    pub fn new(ar: &[f64], ma: &[f64]) -> Self {
        let dim = state_dim(ar.len(), ma.len());

        let mut transition = DMatrix::<f64>::zeros(dim, dim);
        for (i, &phi) in ar.iter().enumerate() {
            transition[(i, 0)] = phi;
        }
        for i in 0..dim.saturating_sub(1) {
            transition[(i, i + 1)] = 1.0;
        }

        let mut selection = DVector::<f64>::zeros(dim);
        selection[0] = 1.0;
        for (j, &theta) in ma.iter().enumerate() {
            selection[j + 1] = theta;
        }
        let state_cov = &selection * selection.transpose();

        Self {
            transition,
            state_cov,
            dim,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Run the filter over `w`.
    ///
    /// `intercept(t)` is the state intercept at (zero-based) time `t`.
    /// Returns `None` when the likelihood is not finite.
    pub fn filter<F>(&self, w: &[f64], intercept: F, burn: usize) -> Option<FilterOutput>
    where
        F: Fn(usize) -> f64,
    {
        let r = self.dim;
        let mut a = DVector::<f64>::zeros(r);
        a[0] = intercept(0);
        let mut p = DMatrix::<f64>::identity(r, r) * DIFFUSE_KAPPA;

        let mut sum_ln_f = 0.0;
        let mut sum_v2_f = 0.0;
        let mut count = 0usize;

        for (t, &wt) in w.iter().enumerate() {
            let f = p[(0, 0)];
            if !(f.is_finite() && f > 0.0) {
                return None;
            }
            let v = wt - a[0];
            let pz = p.column(0).into_owned();

            a += &pz * (v / f);
            p -= &pz * pz.transpose() / f;
            symmetrize(&mut p);

            if t >= burn {
                sum_ln_f += f.ln();
                sum_v2_f += v * v / f;
                count += 1;
            }

            a = &self.transition * a;
            a[0] += intercept(t + 1);
            p = &self.transition * p * self.transition.transpose() + &self.state_cov;
        }

        if count == 0 {
            return None;
        }
        let n = count as f64;
        let sigma2 = sum_v2_f / n;
        if !(sigma2.is_finite() && sigma2 > 0.0) {
            return None;
        }
        let loglik = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0) - 0.5 * sum_ln_f;
        if !loglik.is_finite() {
            return None;
        }

        Some(FilterOutput {
            loglik,
            sigma2,
            nobs_effective: count,
            next_state: a,
        })
    }

    /// Predicted means for `steps` periods starting at the state `start`
    /// (the predicted state for time `t0`).
    pub fn project<F>(&self, start: &DVector<f64>, t0: usize, steps: usize, intercept: F) -> Vec<f64>
    where
        F: Fn(usize) -> f64,
    {
        let mut a = start.clone();
        let mut out = Vec::with_capacity(steps);
        for h in 0..steps {
            if h > 0 {
                a = &self.transition * a;
                a[0] += intercept(t0 + h);
            }
            out.push(a[0]);
        }
        out
    }
}

/// `r = max(p*, q* + 1)`.
pub fn state_dim(ar_len: usize, ma_len: usize) -> usize {
    ar_len.max(ma_len + 1)
}

fn symmetrize(p: &mut DMatrix<f64>) {
    let n = p.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let m = 0.5 * (p[(i, j)] + p[(j, i)]);
            p[(i, j)] = m;
            p[(j, i)] = m;
        }
    }
}
