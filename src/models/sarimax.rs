//! SARIMA(p,d,q)(P,D,Q,s) with an optional deterministic trend.
//!
//! The model for the observed series `y_t` is
//!
//! ```text
//! φ(L) Φ(L^s) (1-L)^d (1-L^s)^D y_t = μ_t + θ(L) Θ(L^s) ε_t,    ε_t ~ N(0, σ²)
//! ```
//!
//! with `μ_t = c + b·t` (either term optional). Differencing is applied to the
//! data first; the differenced series `w_t` then follows an ARMA process whose
//! coefficients are the multiplied-out seasonal polynomials, evaluated by the
//! Kalman filter in `math::kalman`.
//!
//! Coefficients are unconstrained: stationarity and invertibility are not
//! enforced.
//!
//! Parameter vector layout (estimation order):
//!
//! ```text
//! [intercept?, drift?, ar.L1..ar.Lp, ma.L1..ma.Lq, ar.S.Ls..ar.S.L(Ps), ma.S.Ls..ma.S.L(Qs)]
//! ```
//!
//! `σ²` is concentrated out of the likelihood and stored alongside.

use serde::{Deserialize, Serialize};

use crate::domain::{Order, SeasonalOrder, Trend};
use crate::error::AppError;
use crate::math::{ArmaStateSpace, ar_lag_poly, differencing_poly, ma_lag_poly, poly_mul, state_dim};

/// Hyperparameters of a SARIMA model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaxSpec {
    pub order: Order,
    pub seasonal_order: SeasonalOrder,
    pub trend: Option<Trend>,
}

impl SarimaxSpec {
    /// Validate and build a specification.
    pub fn new(order: Order, seasonal_order: SeasonalOrder, trend: Option<Trend>) -> Result<Self, AppError> {
        if seasonal_order.is_active() && seasonal_order.s < 2 {
            return Err(AppError::config(format!(
                "Seasonal order {seasonal_order} needs a seasonal period s >= 2."
            )));
        }
        if seasonal_order.s == 1 {
            return Err(AppError::config("Seasonal period s = 1 is not a seasonal model; use s = 0."));
        }
        Ok(Self {
            order,
            seasonal_order,
            trend,
        })
    }

    fn trend_or_none(&self) -> Trend {
        self.trend.unwrap_or(Trend::None)
    }

    /// Seasonal period, or 0 when there is no seasonal component.
    fn period(&self) -> usize {
        if self.seasonal_order.is_active() { self.seasonal_order.s } else { 0 }
    }

    /// `(1-L)^d (1-L^s)^D`.
    pub fn diff_poly(&self) -> Vec<f64> {
        differencing_poly(self.order.d, self.seasonal_order.d, self.period())
    }

    /// Observations consumed by differencing.
    pub fn diff_lag(&self) -> usize {
        self.order.d + self.seasonal_order.d * self.period()
    }

    /// Highest AR lag after multiplying out the seasonal polynomial.
    pub fn ar_lag(&self) -> usize {
        self.order.p + self.seasonal_order.p * self.period()
    }

    /// Highest MA lag after multiplying out the seasonal polynomial.
    pub fn ma_lag(&self) -> usize {
        self.order.q + self.seasonal_order.q * self.period()
    }

    /// Dimension of the state vector.
    pub fn state_dim(&self) -> usize {
        state_dim(self.ar_lag(), self.ma_lag())
    }

    /// Number of estimated coefficients (excluding `σ²`).
    pub fn param_count(&self) -> usize {
        self.trend_or_none().param_count()
            + self.order.p
            + self.order.q
            + self.seasonal_order.p
            + self.seasonal_order.q
    }

    /// Minimum series length for estimation.
    ///
    /// Differencing consumes `d + s·D` points, the diffuse start consumes the
    /// state dimension, and at least one degree of freedom must remain beyond
    /// the estimated coefficients.
    pub fn min_observations(&self) -> usize {
        self.diff_lag() + self.state_dim() + self.param_count() + 1
    }

    /// Coefficient names, in parameter-vector order, followed by `sigma2`.
    pub fn param_names(&self) -> Vec<String> {
        let trend = self.trend_or_none();
        let s = self.seasonal_order.s;
        let mut names = Vec::with_capacity(self.param_count() + 1);
        if trend.has_constant() {
            names.push("intercept".to_string());
        }
        if trend.has_linear() {
            names.push("drift".to_string());
        }
        names.extend((1..=self.order.p).map(|i| format!("ar.L{i}")));
        names.extend((1..=self.order.q).map(|i| format!("ma.L{i}")));
        names.extend((1..=self.seasonal_order.p).map(|i| format!("ar.S.L{}", i * s)));
        names.extend((1..=self.seasonal_order.q).map(|i| format!("ma.S.L{}", i * s)));
        names.push("sigma2".to_string());
        names
    }

    /// Lags of `w` used as AR regressors (non-seasonal then seasonal).
    pub fn ar_regressor_lags(&self) -> Vec<usize> {
        let s = self.period();
        (1..=self.order.p).chain((1..=self.seasonal_order.p).map(|i| i * s)).collect()
    }

    /// Lags of the innovations used as MA regressors (non-seasonal then seasonal).
    pub fn ma_regressor_lags(&self) -> Vec<usize> {
        let s = self.period();
        (1..=self.order.q).chain((1..=self.seasonal_order.q).map(|i| i * s)).collect()
    }
}

impl std::fmt::Display for SarimaxSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SARIMAX{}x{}", self.order, self.seasonal_order)?;
        if let Some(trend) = self.trend {
            write!(f, " trend={}", trend.code())?;
        }
        Ok(())
    }
}

/// Estimated coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaxParams {
    pub intercept: Option<f64>,
    pub drift: Option<f64>,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    pub sigma2: f64,
}

impl SarimaxParams {
    /// Unpack an estimation vector (see module docs for the layout).
    ///
    /// # Panics
    /// Panics if `x.len() != spec.param_count()`.
    pub fn from_vec(spec: &SarimaxSpec, x: &[f64], sigma2: f64) -> Self {
        assert_eq!(x.len(), spec.param_count(), "parameter vector length mismatch");
        let trend = spec.trend_or_none();
        let mut it = x.iter().copied();
        let mut take = |n: usize| -> Vec<f64> { it.by_ref().take(n).collect() };

        let intercept = if trend.has_constant() { take(1).first().copied() } else { None };
        let drift = if trend.has_linear() { take(1).first().copied() } else { None };
        let ar = take(spec.order.p);
        let ma = take(spec.order.q);
        let seasonal_ar = take(spec.seasonal_order.p);
        let seasonal_ma = take(spec.seasonal_order.q);

        Self {
            intercept,
            drift,
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
            sigma2,
        }
    }

    /// Pack into an estimation vector (without `σ²`).
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::new();
        out.extend(self.intercept);
        out.extend(self.drift);
        out.extend_from_slice(&self.ar);
        out.extend_from_slice(&self.ma);
        out.extend_from_slice(&self.seasonal_ar);
        out.extend_from_slice(&self.seasonal_ma);
        out
    }

    /// All values in the order of [`SarimaxSpec::param_names`].
    pub fn values_with_sigma2(&self) -> Vec<f64> {
        let mut out = self.to_vec();
        out.push(self.sigma2);
        out
    }

    /// Multiplied-out AR coefficients `φ*_k` (`w_t = Σ φ*_k w_{t-k} + ...`).
    pub fn reduced_ar(&self, spec: &SarimaxSpec) -> Vec<f64> {
        let poly = poly_mul(
            &ar_lag_poly(&self.ar, 1),
            &ar_lag_poly(&self.seasonal_ar, spec.period().max(1)),
        );
        poly.iter().skip(1).map(|c| -c).collect()
    }

    /// Multiplied-out MA coefficients `θ*_k`.
    pub fn reduced_ma(&self, spec: &SarimaxSpec) -> Vec<f64> {
        let poly = poly_mul(
            &ma_lag_poly(&self.ma, 1),
            &ma_lag_poly(&self.seasonal_ma, spec.period().max(1)),
        );
        poly.into_iter().skip(1).collect()
    }

    /// Deterministic trend `μ_t` at zero-based time `t` of the differenced series.
    pub fn trend_at(&self, t: usize) -> f64 {
        self.intercept.unwrap_or(0.0) + self.drift.unwrap_or(0.0) * (t as f64 + 1.0)
    }

    pub fn state_space(&self, spec: &SarimaxSpec) -> ArmaStateSpace {
        ArmaStateSpace::new(&self.reduced_ar(spec), &self.reduced_ma(spec))
    }
}
