//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads the configuration
//! - initializes logging
//! - dispatches to the pipeline steps
//! - prints reports and writes optional exports

use chrono::Datelike;
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, FetchArgs, ForecastArgs, OrganizeArgs, RunArgs, TrainArgs, rewrite_args};
use crate::config::PipelineConfig;
use crate::data::{EiaClient, YearSource};
use crate::error::AppError;
use crate::report;

pub mod pipeline;

/// Entry point for the `brent` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    crate::logging::init(cli.verbose);
    let config = PipelineConfig::load(&cli.config)?;

    match cli.command {
        Command::Fetch(args) => handle_fetch(&config, args),
        Command::Organize(args) => handle_organize(&config, args),
        Command::Train(args) => handle_train(&config, args),
        Command::Run(args) => handle_run(&config, args),
        Command::Forecast(args) => handle_forecast(&config, args),
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

fn handle_fetch(config: &PipelineConfig, args: FetchArgs) -> Result<(), AppError> {
    let client = EiaClient::from_env()?;
    let output = args.output.unwrap_or_else(|| config.data.raw_filepath.clone());
    let years = args.years.unwrap_or(config.data.size);

    let acquisition = pipeline::fetch(&client, args.current_year.unwrap_or_else(current_year), years, &output)?;
    print!("{}", report::format_acquisition(&acquisition));
    Ok(())
}

fn handle_organize(config: &PipelineConfig, args: OrganizeArgs) -> Result<(), AppError> {
    let input = args.input.unwrap_or_else(|| config.data.raw_filepath.clone());
    let output = args.output.unwrap_or_else(|| config.data.process_filepath.clone());

    let normalized = crate::data::organize(&input, &output, &config.data.series)?;
    print!("{}", report::format_normalize(&normalized));
    Ok(())
}

fn handle_train(config: &PipelineConfig, args: TrainArgs) -> Result<(), AppError> {
    let dataset = args.dataset.unwrap_or_else(|| config.data.dataset_filepath.clone());
    let model_path = args.model.unwrap_or_else(|| config.model.path.clone());

    let out = pipeline::train(config, &dataset, &model_path, args.trend)?;
    if let Some(path) = &args.prepared {
        crate::data::write_prepared(path, &out.prepared)?;
        info!(path = %path.display(), "prepared series written");
    }
    print_training(&out);
    println!("Model saved to {}", model_path.display());
    Ok(())
}

fn handle_run(config: &PipelineConfig, args: RunArgs) -> Result<(), AppError> {
    let client = if config.data.create_rawdata && !args.skip_fetch {
        Some(EiaClient::from_env()?)
    } else {
        None
    };
    let source = client.as_ref().map(|c| c as &dyn YearSource);

    let out = pipeline::run(config, source, current_year())?;
    if let Some(acquisition) = &out.acquisition {
        print!("{}", report::format_acquisition(acquisition));
    }
    print!("{}", report::format_normalize(&out.normalize));
    print_training(&out.train);
    println!("Model saved to {}", config.model.path.display());
    Ok(())
}

fn handle_forecast(config: &PipelineConfig, args: ForecastArgs) -> Result<(), AppError> {
    let days = args.days.unwrap_or(config.forecast.min_days);
    let model_path = args.model.unwrap_or_else(|| config.model.path.clone());
    let dataset = args.dataset.unwrap_or_else(|| config.data.dataset_filepath.clone());

    let out = pipeline::forecast(config, &model_path, &dataset, days)?;
    if let Some(summary) = &out.summary {
        println!("{}", report::format_price_summary(summary));
    }
    print!("{}", report::format_forecast_table(&out.forecast));

    if let Some(path) = &args.export {
        crate::io::write_forecast_csv(path, &out.forecast)?;
        println!("Forecast exported to {}", path.display());
    }
    Ok(())
}

fn print_training(out: &pipeline::TrainOutput) {
    println!("{}", report::format_series_head(&out.prepared, 5));
    if let Some(summary) = out.model.summary() {
        println!("{}", report::format_fit_summary(&summary));
    }
    print!("{}", report::format_forecast_table(&out.preview));
}
