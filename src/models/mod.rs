//! Seasonal ARIMA model.
//!
//! - `sarimax`: hyperparameters, parameter layout, and state-space construction
//! - `forecaster`: the user-facing model lifecycle (fit / forecast / save / load)

pub mod forecaster;
pub mod sarimax;

pub use forecaster::*;
pub use sarimax::*;
