//! Export forecasts to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::domain::Forecast;
use crate::error::AppError;

/// Write a dated forecast as `date,forecast_price`.
pub fn write_forecast_csv(path: &Path, forecast: &Forecast) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "date,forecast_price")
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for p in &forecast.points {
        writeln!(file, "{},{:.4}", p.date, p.value)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
