//! Least squares for starting values.
//!
//! The Hannan-Rissanen start runs two small regressions:
//!
//! ```text
//! w_t = c + Σ a_k w_{t-k} + e_t                  (long autoregression)
//! w_t = trend_t + Σ φ_k w_{t-k} + Σ θ_k ê_{t-k}  (ARMA on estimated innovations)
//! ```
//!
//! Lagged price levels are strongly collinear, so the solve goes through SVD and
//! retries with looser singular-value cutoffs before giving up.

use nalgebra::{DMatrix, DVector};

const SVD_TOLERANCES: [f64; 3] = [1e-10, 1e-8, 1e-6];

/// Coefficients and in-sample residuals of a least squares fit.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    pub residuals: DVector<f64>,
}

impl LeastSquares {
    /// Mean squared residual.
    pub fn residual_variance(&self) -> f64 {
        if self.residuals.is_empty() {
            return 0.0;
        }
        self.residuals.norm_squared() / self.residuals.len() as f64
    }
}

/// Regress `y` on the columns of `x`.
///
/// `None` on a shape mismatch, an empty system, or when no tolerance yields a
/// finite solution.
pub fn least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LeastSquares> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return None;
    }
    let svd = x.clone().svd(true, true);

    let beta = SVD_TOLERANCES
        .iter()
        .filter_map(|&tol| svd.solve(y, tol).ok())
        .find(|b| b.iter().all(|v| v.is_finite()))?;
    let residuals = y - x * &beta;
    Some(LeastSquares { beta, residuals })
}
