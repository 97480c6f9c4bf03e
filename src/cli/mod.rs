//! Command-line parsing for the Brent price forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data/model code. Paths and horizons default to the values in
//! `config.yaml`; flags override them for a single invocation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::domain::Trend;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "brent", version, about = "Brent crude spot price forecaster (EIA data, SARIMA model)")]
pub struct Cli {
    /// YAML configuration file (missing file = built-in defaults).
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log at debug level (RUST_LOG takes precedence when set).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the raw yearly archive from the EIA API (needs API_KEY).
    Fetch(FetchArgs),
    /// Normalize the raw archive into the canonical `id,date,price` table.
    Organize(OrganizeArgs),
    /// Prepare the dataset, fit the model, preview a forecast and save the model.
    Train(TrainArgs),
    /// Full pipeline: optional fetch, organize, train.
    Run(RunArgs),
    /// Load the saved model and print the price summary and a dated forecast.
    Forecast(ForecastArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Number of past years to download (default: `data.size`).
    #[arg(short = 'n', long)]
    pub years: Option<usize>,

    /// Archive path (default: `data.raw_filepath`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Count years back from this one instead of the current year.
    #[arg(long)]
    pub current_year: Option<i32>,
}

#[derive(Debug, Args, Clone)]
pub struct OrganizeArgs {
    /// Raw archive (default: `data.raw_filepath`).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Canonical table (default: `data.process_filepath`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Canonical table to train on (default: `data.dataset_filepath`).
    #[arg(short, long)]
    pub dataset: Option<PathBuf>,

    /// Where to save the fitted model (default: `model.path`).
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Override the configured trend term.
    #[arg(long, value_enum)]
    pub trend: Option<Trend>,

    /// Write the prepared `unique_id,ds,y` series here as well.
    #[arg(long)]
    pub prepared: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Skip the download even if `data.create_rawdata` is true.
    #[arg(long)]
    pub skip_fetch: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Days to forecast (bounded by `forecast.min_days..=forecast.max_days`).
    #[arg(short, long)]
    pub days: Option<usize>,

    /// Saved model (default: `model.path`).
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Price history for the summary table (default: `data.dataset_filepath`).
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Export the forecast to CSV (`date,forecast_price`).
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Rewrite argv so `brent` defaults to `brent forecast`.
///
/// Rules:
/// - `brent`                        -> `brent forecast`
/// - `brent -d 3 ...`               -> `brent forecast -d 3 ...`
/// - `brent --help/--version/-h`    -> unchanged (show top-level help/version)
pub fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("forecast".to_string());
        return argv;
    };

    let forecast_flag = matches!(arg1.as_str(), "-d" | "--days" | "--export")
        || arg1.starts_with("--days=")
        || arg1.starts_with("--export=");
    if forecast_flag {
        argv.insert(1, "forecast".to_string());
    }
    argv
}
