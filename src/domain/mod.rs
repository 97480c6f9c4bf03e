//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model hyperparameters (`Order`, `SeasonalOrder`, `Trend`)
//! - price rows as loaded from disk (`PriceTable`, `PriceRow`) and normalized (`PriceRecord`)
//! - the model-ready series (`PreparedSeries`)
//! - forecast outputs (`Forecast`, `ForecastPoint`)

pub mod types;

pub use types::*;
