//! End-to-end pipeline: fake EIA source -> archive -> table -> model -> forecast.

use std::path::Path;

use approx::assert_relative_eq;
use brent_forecast::app::pipeline;
use brent_forecast::config::PipelineConfig;
use brent_forecast::data::{self, YearSource};
use brent_forecast::domain::{BRENT_SERIES, Order, SeasonalOrder};
use brent_forecast::error::{AppError, ErrorKind};
use brent_forecast::io::{read_archive, read_price_table};
use brent_forecast::models::ForecastModel;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde_json::{Value, json};

/// Serves weekday prices for every year except `failing`.
struct FakeEia {
    failing: Option<i32>,
}

fn noise(i: i64) -> f64 {
    let x = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407) >> 33;
    x as f64 / (1u64 << 31) as f64 - 0.5
}

fn price_on(date: NaiveDate) -> f64 {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let d = (date - base).num_days();
    let walk: f64 = (0..d).map(|i| 0.6 * noise(i)).sum();
    75.0 + walk + 3.0 * (d as f64 / 40.0).sin() + 0.2 * noise(d + 50_000)
}

impl YearSource for FakeEia {
    fn fetch_year(&self, year: i32) -> Result<Value, AppError> {
        if self.failing == Some(year) {
            return Err(AppError::external(format!("status 503 for {year}")));
        }
        let mut records = Vec::new();
        let mut day = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();
        while day.year() == year {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                records.push(json!({
                    "series-description": BRENT_SERIES,
                    "period": day.to_string(),
                    "value": format!("{:.2}", price_on(day)),
                }));
                records.push(json!({
                    "series-description": "Cushing, OK WTI Spot Price FOB (Dollars per Barrel)",
                    "period": day.to_string(),
                    "value": format!("{:.2}", price_on(day) - 4.0),
                }));
            }
            day -= Duration::days(1);
        }
        Ok(json!({ "response": { "total": records.len(), "data": records } }))
    }
}

fn config_in(dir: &Path, yaml_model: &str) -> PipelineConfig {
    let yaml = format!(
        "data:\n  create_rawdata: true\n  size: 3\n  raw_filepath: {raw}\n  process_filepath: {csv}\n  dataset_filepath: {csv}\n{yaml_model}",
        raw = dir.join("raw").join("raw_data.json").display(),
        csv = dir.join("processed").join("brent.csv").display(),
    );
    PipelineConfig::from_yaml(&yaml).unwrap()
}

#[test]
fn full_run_with_a_failed_year_then_forecast() {
    let dir = tempfile::tempdir().unwrap();
    let model_yaml = format!(
        "model:\n  sarimax_order: [1, 1, 1]\n  seasonal_order: [1, 1, 1, 7]\n  path: {}\n",
        dir.path().join("models").join("sarimax.bin").display()
    );
    let config = config_in(dir.path(), &model_yaml);
    let source = FakeEia { failing: Some(2023) };

    let out = pipeline::run(&config, Some(&source), 2025).unwrap();

    let acquisition = out.acquisition.unwrap();
    assert_eq!(acquisition.requested, vec![2024, 2023, 2022]);
    assert_eq!(acquisition.failed, vec![2023]);
    let slots = read_archive(&config.data.raw_filepath).unwrap();
    assert_eq!(slots.len(), 3);
    assert!(slots[1].is_none());

    // Only Brent rows survive normalization.
    let table = read_price_table(&config.data.process_filepath).unwrap();
    assert_eq!(table.len(), out.normalize.kept);
    assert_eq!(out.normalize.kept, out.normalize.discarded);
    assert!(table.rows.iter().all(|r| r.id.as_deref() == Some(BRENT_SERIES)));

    // Prepared series is ascending even though the API returns newest first.
    let prepared = &out.train.prepared;
    assert_eq!(prepared.len(), table.len());
    assert!(prepared.rows.windows(2).all(|w| w[0].ds < w[1].ds));
    assert_eq!(prepared.last_date(), NaiveDate::from_ymd_opt(2024, 12, 31));

    assert_eq!(out.train.preview.len(), config.forecast.preview_steps);
    assert!(config.model.path.exists());

    let fc = pipeline::forecast(&config, &config.model.path, &config.data.dataset_filepath, 3).unwrap();
    assert_eq!(fc.forecast.len(), 3);
    assert_eq!(fc.forecast.points[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(fc.forecast.points[2].date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
    assert!(fc.forecast.values().iter().all(|v| v.is_finite() && *v > 0.0));

    // The saved model forecasts exactly what the in-memory one did.
    let in_memory = out.train.model.forecast(3).unwrap();
    for (a, b) in in_memory.values().iter().zip(fc.forecast.values()) {
        assert_relative_eq!(*a, b, max_relative = 1e-12);
    }

    let summary = fc.summary.unwrap();
    assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    assert!(summary.previous_price.is_some());
    // 2024-01-01 is a Monday, so the one-year comparison exists.
    assert!(summary.year_ago_price.is_some());
}

#[test]
fn forecast_horizon_is_bounded_by_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "forecast:\n  max_days: 7\n");
    let err = pipeline::forecast(&config, &config.model.path, &config.data.dataset_filepath, 8).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn forecast_without_a_saved_model_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let model_yaml = format!("model:\n  path: {}\n", dir.path().join("absent.bin").display());
    let config = config_in(dir.path(), &model_yaml);
    let err = pipeline::forecast(&config, &config.model.path, &config.data.dataset_filepath, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn run_without_source_organizes_existing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let model_yaml = format!(
        "model:\n  sarimax_order: [1, 1, 0]\n  seasonal_order: [0, 0, 0, 0]\n  trend: c\n  path: {}\n",
        dir.path().join("m.bin").display()
    );
    let config = config_in(dir.path(), &model_yaml);
    data::generate(&FakeEia { failing: None }, 2025, 1, &config.data.raw_filepath).unwrap();

    let out = pipeline::run(&config, None, 2025).unwrap();
    assert!(out.acquisition.is_none());
    assert_eq!(out.normalize.null_slots, 0);
    assert!(out.train.model.is_fitted());
}

#[test]
fn unfit_model_refuses_to_forecast() {
    let model = ForecastModel::new(Order::new(1, 1, 1), SeasonalOrder::new(1, 1, 1, 7), None).unwrap();
    let err = model.forecast(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn malformed_archive_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "");
    std::fs::create_dir_all(config.data.raw_filepath.parent().unwrap()).unwrap();
    std::fs::write(&config.data.raw_filepath, r#"{"response": {"data": []}}"#).unwrap();

    let err = pipeline::run(&config, None, 2025).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}
