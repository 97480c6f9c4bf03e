//! Forecast model lifecycle: construct → fit → forecast, with save/load.
//!
//! A model is either **Unfit** (hyperparameters only) or **Fitted**
//! (hyperparameters plus estimated state). `fit` consumes an unfit model and
//! returns a fitted one; a fitted model is never re-fit in place.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Forecast, Order, PreparedSeries, SeasonalOrder, Trend};
use crate::error::AppError;
use crate::fit::{FitOptions, fit_sarimax};
use crate::io::{FittedBlob, MODEL_FORMAT_VERSION, StoredModel, read_model, write_model};
use crate::math::{apply_difference, integrate};
use crate::models::sarimax::{SarimaxParams, SarimaxSpec};

const FITTED_STATE_VERSION: u32 = 1;

/// Everything a fitted model needs to forecast and report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedState {
    pub params: SarimaxParams,
    pub loglik: f64,
    pub nobs: usize,
    pub nobs_effective: usize,
    pub iterations: usize,
    pub unique_id: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Observations the model was fit on.
    pub endog: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
enum ModelState {
    Unfit,
    Fitted(Box<FittedState>),
}

/// A named coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    pub name: String,
    pub value: f64,
}

/// Fit diagnostics for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub spec: SarimaxSpec,
    pub coefficients: Vec<Coefficient>,
    pub loglik: f64,
    pub aic: f64,
    pub bic: f64,
    pub nobs: usize,
    pub nobs_effective: usize,
    pub iterations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastModel {
    spec: SarimaxSpec,
    state: ModelState,
}

impl ForecastModel {
    /// Build an unfit model. Invalid hyperparameters are a configuration error.
    pub fn new(order: Order, seasonal_order: SeasonalOrder, trend: Option<Trend>) -> Result<Self, AppError> {
        Ok(Self::from_spec(SarimaxSpec::new(order, seasonal_order, trend)?))
    }

    pub fn from_spec(spec: SarimaxSpec) -> Self {
        Self {
            spec,
            state: ModelState::Unfit,
        }
    }

    pub fn spec(&self) -> &SarimaxSpec {
        &self.spec
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, ModelState::Fitted(_))
    }

    pub fn fitted_state(&self) -> Option<&FittedState> {
        match &self.state {
            ModelState::Fitted(s) => Some(s.as_ref()),
            ModelState::Unfit => None,
        }
    }

    /// Fit with default estimation options.
    pub fn fit(self, series: &PreparedSeries) -> Result<Self, AppError> {
        self.fit_with(series, &FitOptions::default())
    }

    pub fn fit_with(self, series: &PreparedSeries, opts: &FitOptions) -> Result<Self, AppError> {
        if self.is_fitted() {
            return Err(AppError::invalid_state(
                "model is already fit; construct a new model to re-fit",
            ));
        }
        let (Some(first), Some(last)) = (series.rows.first(), series.rows.last()) else {
            return Err(AppError::estimation("Cannot fit a model on an empty series."));
        };

        let endog = series.values();
        info!(spec = %self.spec, nobs = endog.len(), "fitting model");
        let fit = fit_sarimax(&self.spec, &endog, opts)?;
        debug!(params = ?fit.params, loglik = fit.loglik, "model fitted");

        let state = FittedState {
            params: fit.params,
            loglik: fit.loglik,
            nobs: endog.len(),
            nobs_effective: fit.nobs_effective,
            iterations: fit.iterations,
            unique_id: first.unique_id.clone(),
            first_date: first.ds,
            last_date: last.ds,
            endog,
        };
        Ok(Self {
            spec: self.spec,
            state: ModelState::Fitted(Box::new(state)),
        })
    }

    /// Predicted means for the `steps` days following the last observation.
    pub fn forecast(&self, steps: usize) -> Result<Forecast, AppError> {
        let ModelState::Fitted(state) = &self.state else {
            return Err(AppError::invalid_state("model must be fit before forecasting"));
        };
        if steps == 0 {
            return Err(AppError::invalid_input("forecast steps must be at least 1"));
        }

        let spec = &self.spec;
        let params = &state.params;
        let poly = spec.diff_poly();
        let w = apply_difference(&state.endog, &poly);

        let ss = params.state_space(spec);
        let filtered = ss
            .filter(&w, |t| params.trend_at(t), spec.state_dim())
            .ok_or_else(|| AppError::estimation("Likelihood is not finite for the stored parameters."))?;

        let w_future = ss.project(&filtered.next_state, w.len(), steps, |t| params.trend_at(t));
        let values = integrate(&state.endog, &w_future, &poly);
        Ok(Forecast::daily_after(state.last_date, &values))
    }

    /// Named coefficients and information criteria; `None` while unfit.
    pub fn summary(&self) -> Option<FitSummary> {
        let state = self.fitted_state()?;
        let coefficients = self
            .spec
            .param_names()
            .into_iter()
            .zip(state.params.values_with_sigma2())
            .map(|(name, value)| Coefficient { name, value })
            .collect();

        // sigma2 counts as an estimated parameter.
        let k = (self.spec.param_count() + 1) as f64;
        let aic = -2.0 * state.loglik + 2.0 * k;
        let bic = -2.0 * state.loglik + k * (state.nobs_effective as f64).ln();

        Some(FitSummary {
            spec: self.spec,
            coefficients,
            loglik: state.loglik,
            aic,
            bic,
            nobs: state.nobs,
            nobs_effective: state.nobs_effective,
            iterations: state.iterations,
            first_date: state.first_date,
            last_date: state.last_date,
        })
    }

    /// Persist to `path` (binary, versioned).
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let fitted = match &self.state {
            ModelState::Fitted(state) => Some(FittedBlob::encode(FITTED_STATE_VERSION, state.as_ref())?),
            ModelState::Unfit => None,
        };
        let stored = StoredModel {
            format_version: MODEL_FORMAT_VERSION,
            order: self.spec.order,
            seasonal_order: self.spec.seasonal_order,
            trend: self.spec.trend,
            fitted,
        };
        write_model(path, &stored)?;
        info!(path = %path.display(), fitted = self.is_fitted(), "model saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let stored = read_model(path)?;
        let spec = SarimaxSpec::new(stored.order, stored.seasonal_order, stored.trend)
            .map_err(|e| AppError::malformed(format!("'{}': {}", path.display(), e.message())))?;

        let state = match &stored.fitted {
            Some(blob) => {
                let state: FittedState = blob.decode(FITTED_STATE_VERSION)?;
                if state.params.to_vec().len() != spec.param_count() {
                    return Err(AppError::malformed(format!(
                        "'{}': stored coefficients do not match the model orders",
                        path.display()
                    )));
                }
                ModelState::Fitted(Box::new(state))
            }
            None => ModelState::Unfit,
        };
        debug!(path = %path.display(), spec = %spec, "model loaded");
        Ok(Self { spec, state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PreparedRow;
    use crate::error::ErrorKind;

    fn series(values: &[f64]) -> PreparedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PreparedSeries {
            rows: values
                .iter()
                .enumerate()
                .map(|(i, &y)| PreparedRow {
                    unique_id: "brent".into(),
                    ds: start + chrono::Duration::days(i as i64),
                    y,
                })
                .collect(),
        }
    }

    /// Uniform noise on [-0.5, 0.5), deterministic in `i`.
    fn noise(i: u64) -> f64 {
        let x = i.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407) >> 33;
        x as f64 / (1u64 << 31) as f64 - 0.5
    }

    /// Random walk with a weekly pattern and observation noise.
    fn prices(n: usize) -> Vec<f64> {
        let mut level = 75.0;
        (0..n as u64)
            .map(|i| {
                level += 0.8 * noise(i);
                level + 0.5 * (i % 7) as f64 + 0.3 * noise(i + 10_000)
            })
            .collect()
    }

    #[test]
    fn forecast_before_fit_is_invalid_state() {
        let model = ForecastModel::new(Order::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7), None).unwrap();
        let err = model.forecast(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.message(), "model must be fit before forecasting");
        assert!(model.summary().is_none());
    }

    #[test]
    fn five_prices_forecast_next_two_days() {
        let model = ForecastModel::new(Order::new(1, 0, 0), SeasonalOrder::none(), None).unwrap();
        let fitted = model.fit(&series(&[70.0, 71.5, 69.8, 72.0, 73.1])).unwrap();
        let fc = fitted.forecast(2).unwrap();

        assert_eq!(fc.len(), 2);
        assert_eq!(fc.points[0].date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(fc.points[1].date, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        assert!(fc.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn zero_steps_is_invalid_input() {
        let fitted = ForecastModel::new(Order::new(1, 0, 0), SeasonalOrder::none(), None)
            .unwrap()
            .fit(&series(&[70.0, 71.5, 69.8, 72.0, 73.1]))
            .unwrap();
        assert_eq!(fitted.forecast(0).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn refit_is_rejected() {
        let data = series(&[70.0, 71.5, 69.8, 72.0, 73.1]);
        let fitted = ForecastModel::new(Order::new(1, 0, 0), SeasonalOrder::none(), None)
            .unwrap()
            .fit(&data)
            .unwrap();
        assert_eq!(fitted.fit(&data).unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn forecast_is_repeatable() {
        let fitted = ForecastModel::new(Order::new(1, 1, 0), SeasonalOrder::none(), Some(Trend::Constant))
            .unwrap()
            .fit(&series(&prices(60)))
            .unwrap();
        assert_eq!(fitted.forecast(5).unwrap(), fitted.forecast(5).unwrap());
    }

    #[test]
    fn seasonal_model_saves_and_reloads_identically() {
        let fitted = ForecastModel::new(Order::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7), None)
            .unwrap()
            .fit(&series(&prices(140)))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("sarimax.bin");
        fitted.save(&path).unwrap();
        let loaded = ForecastModel::load(&path).unwrap();

        assert_eq!(loaded, fitted);
        assert_eq!(loaded.forecast(7).unwrap(), fitted.forecast(7).unwrap());
    }

    #[test]
    fn unfit_model_round_trips_as_unfit() {
        let model = ForecastModel::new(Order::new(2, 1, 0), SeasonalOrder::none(), Some(Trend::Linear)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unfit.bin");
        model.save(&path).unwrap();
        let loaded = ForecastModel::load(&path).unwrap();
        assert!(!loaded.is_fitted());
        assert_eq!(loaded.spec(), model.spec());
    }

    #[test]
    fn summary_names_every_coefficient() {
        let fitted = ForecastModel::new(Order::new(1, 1, 1), SeasonalOrder::none(), Some(Trend::Constant))
            .unwrap()
            .fit(&series(&prices(80)))
            .unwrap();
        let summary = fitted.summary().unwrap();
        let names: Vec<&str> = summary.coefficients.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["intercept", "ar.L1", "ma.L1", "sigma2"]);
        assert!(summary.aic.is_finite());
        assert!(summary.bic > summary.aic);
        assert_eq!(summary.nobs, 80);
    }

    #[test]
    fn random_walk_forecasts_last_observation() {
        let data = prices(30);
        let last = *data.last().unwrap();
        let fitted = ForecastModel::new(Order::new(0, 1, 0), SeasonalOrder::none(), None)
            .unwrap()
            .fit(&series(&data))
            .unwrap();
        for v in fitted.forecast(4).unwrap().values() {
            assert!((v - last).abs() < 1e-9, "{v} vs {last}");
        }
    }
}
