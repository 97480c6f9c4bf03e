//! Shared pipeline steps used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> organize -> load/preprocess -> fit -> preview -> save
//!
//! The CLI layer can then focus on presentation (printing and exports).

use std::path::Path;

use tracing::info;

use crate::config::PipelineConfig;
use crate::data::{self, AcquisitionReport, NormalizeReport, YearSource};
use crate::domain::{Forecast, PreparedSeries, Trend};
use crate::error::AppError;
use crate::models::ForecastModel;
use crate::report::{PriceSummary, price_summary};

/// Outputs of a training run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub prepared: PreparedSeries,
    pub model: ForecastModel,
    pub preview: Forecast,
}

/// Outputs of a full run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub acquisition: Option<AcquisitionReport>,
    pub normalize: NormalizeReport,
    pub train: TrainOutput,
}

/// Outputs of a forecast request.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub summary: Option<PriceSummary>,
    pub forecast: Forecast,
}

/// Download `years` past years into `output`.
pub fn fetch(
    source: &dyn YearSource,
    current_year: i32,
    years: usize,
    output: &Path,
) -> Result<AcquisitionReport, AppError> {
    if years == 0 {
        return Err(AppError::invalid_input("number of years must be at least 1"));
    }
    info!(years, current_year, "getting raw data");
    data::generate(source, current_year, years, output)
}

/// Load and prepare `dataset`, fit the configured model, preview a forecast,
/// and save the fitted model to `model_path`.
pub fn train(
    config: &PipelineConfig,
    dataset: &Path,
    model_path: &Path,
    trend: Option<Trend>,
) -> Result<TrainOutput, AppError> {
    let prepared = data::load_prepared(dataset)?;
    info!(rows = prepared.len(), "dataset prepared");

    let mut model_config = config.model.clone();
    if trend.is_some() {
        model_config.trend = trend;
    }
    let model = model_config.build()?.fit(&prepared)?;
    let preview = model.forecast(config.forecast.preview_steps)?;

    model.save(model_path)?;
    Ok(TrainOutput {
        prepared,
        model,
        preview,
    })
}

/// Full pipeline. `source` is only used when the config asks for fresh data.
pub fn run(
    config: &PipelineConfig,
    source: Option<&dyn YearSource>,
    current_year: i32,
) -> Result<RunOutput, AppError> {
    let data_cfg = &config.data;

    let acquisition = match source {
        Some(source) if data_cfg.create_rawdata => {
            Some(fetch(source, current_year, data_cfg.size, &data_cfg.raw_filepath)?)
        }
        _ => None,
    };

    info!("organizing raw data");
    let normalize = data::organize(&data_cfg.raw_filepath, &data_cfg.process_filepath, &data_cfg.series)?;

    info!("training model");
    let train = train(config, &data_cfg.dataset_filepath, &config.model.path, None)?;

    Ok(RunOutput {
        acquisition,
        normalize,
        train,
    })
}

/// Load a saved model and forecast `days` ahead, alongside the recent-price
/// summary of `dataset`.
pub fn forecast(
    config: &PipelineConfig,
    model_path: &Path,
    dataset: &Path,
    days: usize,
) -> Result<ForecastOutput, AppError> {
    config.check_horizon(days)?;
    let model = ForecastModel::load(model_path)?;
    let forecast = model.forecast(days)?;

    let summary = if dataset.exists() {
        price_summary(&data::load_prepared(dataset)?)
    } else {
        info!(path = %dataset.display(), "dataset not found; skipping price summary");
        None
    };

    Ok(ForecastOutput { summary, forecast })
}
