//! Pipeline configuration (`config.yaml`).
//!
//! Every field has a default, so a partial file (or no file at all) is valid.
//! Unknown keys are ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::domain::{BRENT_SERIES, Order, SeasonalOrder, Trend};
use crate::error::AppError;
use crate::models::ForecastModel;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Download a fresh raw archive before organizing.
    pub create_rawdata: bool,
    /// Number of past years to download.
    pub size: usize,
    pub raw_filepath: PathBuf,
    /// Where the canonical table is written.
    pub process_filepath: PathBuf,
    /// Where the canonical table is read for training.
    pub dataset_filepath: PathBuf,
    pub series: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub sarimax_order: Order,
    pub seasonal_order: SeasonalOrder,
    pub trend: Option<Trend>,
    #[serde(alias = "save_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub min_days: usize,
    pub max_days: usize,
    /// Steps forecast right after training, as a sanity preview.
    pub preview_steps: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            create_rawdata: true,
            size: 3,
            raw_filepath: PathBuf::from("data/raw/raw_data.json"),
            process_filepath: PathBuf::from("data/processed/brent.csv"),
            dataset_filepath: PathBuf::from("data/processed/brent.csv"),
            series: BRENT_SERIES.to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            sarimax_order: Order::new(1, 1, 1),
            seasonal_order: SeasonalOrder::new(1, 1, 1, 7),
            trend: None,
            path: PathBuf::from("models/sarimax.bin"),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_days: 1,
            max_days: 7,
            preview_steps: 5,
        }
    }
}

impl PipelineConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::io(format!("Failed to read config '{}': {e}", path.display())))?;
        Self::from_yaml(&text).map_err(|e| AppError::config(format!("'{}': {}", path.display(), e.message())))
    }

    pub fn from_yaml(text: &str) -> Result<Self, AppError> {
        // An empty document deserializes as unit; treat it as "all defaults".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| AppError::config(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.data.size == 0 {
            return Err(AppError::config("data.size must be at least 1"));
        }
        if self.data.series.trim().is_empty() {
            return Err(AppError::config("data.series must not be empty"));
        }
        let f = &self.forecast;
        if f.min_days == 0 || f.min_days > f.max_days {
            return Err(AppError::config(format!(
                "forecast days must satisfy 1 <= min_days <= max_days (got {}..={})",
                f.min_days, f.max_days
            )));
        }
        if f.preview_steps == 0 {
            return Err(AppError::config("forecast.preview_steps must be at least 1"));
        }
        // Surfaces bad orders at load time instead of after a download.
        self.model.build()?;
        Ok(())
    }

    /// Check a requested horizon against the configured bounds.
    pub fn check_horizon(&self, days: usize) -> Result<(), AppError> {
        let f = &self.forecast;
        if days < f.min_days || days > f.max_days {
            return Err(AppError::invalid_input(format!(
                "forecast days must be between {} and {} (got {days})",
                f.min_days, f.max_days
            )));
        }
        Ok(())
    }
}

impl ModelConfig {
    /// An unfit model with the configured hyperparameters.
    pub fn build(&self) -> Result<ForecastModel, AppError> {
        ForecastModel::new(self.sarimax_order, self.seasonal_order, self.trend)
    }
}
