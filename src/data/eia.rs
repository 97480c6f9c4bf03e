//! EIA v2 API integration for the daily Brent spot price.
//!
//! History is pulled one calendar year per request (the API caps a response
//! at 5000 rows) and archived as a JSON array with one slot per year. A year
//! that fails to download is archived as `null`; the other years still run.

use std::path::Path;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::io::write_archive;

const BASE_URL: &str = "https://api.eia.gov/v2/petroleum/pri/spt/data/";
const PAGE_LENGTH: usize = 5000;

/// Source of one year of raw daily records.
pub trait YearSource {
    fn fetch_year(&self, year: i32) -> Result<Value, AppError>;
}

pub struct EiaClient {
    client: Client,
    api_key: String,
}

impl EiaClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Read `API_KEY` from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("API_KEY")
            .map_err(|_| AppError::config("Missing API_KEY in environment (.env)."))?;
        if api_key.trim().is_empty() {
            return Err(AppError::config("API_KEY is empty."));
        }
        Ok(Self::new(api_key))
    }
}

impl YearSource for EiaClient {
    fn fetch_year(&self, year: i32) -> Result<Value, AppError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&query_params(&self.api_key, year))
            .send()
            .map_err(|e| AppError::external(format!("EIA request for {year} failed: {e}")))?;

        if resp.status() != StatusCode::OK {
            return Err(AppError::external(format!(
                "EIA request for {year} failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::external(format!("Failed to parse EIA response for {year}: {e}")))
    }
}

/// Query string for one calendar year of daily values, newest first.
pub fn query_params(api_key: &str, year: i32) -> Vec<(&'static str, String)> {
    vec![
        ("api_key", api_key.to_string()),
        ("frequency", "daily".to_string()),
        ("data[0]", "value".to_string()),
        ("start", format!("{year}-01-01")),
        ("end", format!("{year}-12-31")),
        ("sort[0][column]", "period".to_string()),
        ("sort[0][direction]", "desc".to_string()),
        ("offset", "0".to_string()),
        ("length", PAGE_LENGTH.to_string()),
    ]
}

/// The `n` years before `current_year`, most recent first.
pub fn gap_years(current_year: i32, n: usize) -> Vec<i32> {
    (1..=n as i32).map(|k| current_year - k).collect()
}

/// Outcome of an acquisition run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcquisitionReport {
    pub requested: Vec<i32>,
    pub fetched: Vec<i32>,
    pub failed: Vec<i32>,
}

/// Fetch `n` past years from `source` and archive them to `output`.
///
/// Per-year failures are logged and stored as `null`; only writing the
/// archive can fail the call.
pub fn generate<S: YearSource + ?Sized>(
    source: &S,
    current_year: i32,
    n: usize,
    output: &Path,
) -> Result<AcquisitionReport, AppError> {
    let years = gap_years(current_year, n);
    let mut report = AcquisitionReport {
        requested: years.clone(),
        ..AcquisitionReport::default()
    };

    let mut slots: Vec<Option<Value>> = Vec::with_capacity(years.len());
    for year in years {
        match source.fetch_year(year) {
            Ok(payload) => {
                info!(year, "fetched raw prices");
                report.fetched.push(year);
                slots.push(Some(payload));
            }
            Err(e) => {
                warn!(year, error = %e, "year not fetched; archiving null");
                report.failed.push(year);
                slots.push(None);
            }
        }
    }

    write_archive(output, &slots)?;
    info!(
        path = %output.display(),
        fetched = report.fetched.len(),
        failed = report.failed.len(),
        "raw archive written"
    );
    Ok(report)
}
