//! Canonical price table CSV (`id,date,price`) and the prepared CSV
//! (`unique_id,ds,y`).
//!
//! Reading is lenient per cell (a bad cell becomes a missing value) and strict
//! per schema (a missing column is an error).

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;

use crate::domain::{PreparedSeries, PriceRecord, PriceRow, PriceTable};
use crate::error::AppError;

/// Accepted header names per column: canonical first, prepared alias second.
const ID_COLUMNS: [&str; 2] = ["id", "unique_id"];
const DATE_COLUMNS: [&str; 2] = ["date", "ds"];
const PRICE_COLUMNS: [&str; 2] = ["price", "y"];

/// Cell contents treated as missing.
const MISSING_TOKENS: [&str; 7] = ["nan", "na", "n/a", "null", "none", "nat", "-"];

pub fn read_price_table(path: &Path) -> Result<PriceTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::malformed(format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    let id_idx = resolve_column(&header_map, &ID_COLUMNS, path)?;
    let date_idx = resolve_column(&header_map, &DATE_COLUMNS, path)?;
    let price_idx = resolve_column(&header_map, &PRICE_COLUMNS, path)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::malformed(format!("'{}' row {}: {e}", path.display(), line + 2))
        })?;
        rows.push(PriceRow {
            id: get_cell(&record, id_idx).map(str::to_string),
            date: get_cell(&record, date_idx).and_then(parse_date),
            price: get_cell(&record, price_idx).and_then(parse_price),
        });
    }

    Ok(PriceTable { rows })
}

/// Write normalized records as `id,date,price`.
pub fn write_price_records(path: &Path, records: &[PriceRecord]) -> Result<(), AppError> {
    write_rows(path, &["id", "date", "price"], records)
}

/// Write a prepared series as `unique_id,ds,y`.
pub fn write_prepared_csv(path: &Path, series: &PreparedSeries) -> Result<(), AppError> {
    write_rows(path, &["unique_id", "ds", "y"], &series.rows)
}

/// The header is written explicitly so an empty table still gets one.
fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let write_err = |e: csv::Error| AppError::io(format!("Failed to write CSV '{}': {e}", path.display()));

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(write_err)?;
    writer.write_record(header).map_err(write_err)?;
    for row in rows {
        writer.serialize(row).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV '{}': {e}", path.display())))
}

/// Parse a calendar date.
///
/// ISO (`YYYY-MM-DD`) is the canonical form; a trailing time part
/// (`2024-03-01T00:00:00`, `2024-03-01 00:00`) is ignored, and a few common
/// spreadsheet layouts are accepted as well.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    let (day, rest) = (s.get(..10)?, s.get(10..)?);
    if rest.starts_with('T') || rest.starts_with(' ') {
        return NaiveDate::parse_from_str(day, "%Y-%m-%d").ok();
    }
    None
}

fn parse_price(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_column(header_map: &HashMap<String, usize>, names: &[&str], path: &Path) -> Result<usize, AppError> {
    names
        .iter()
        .find_map(|n| header_map.get(*n).copied())
        .ok_or_else(|| {
            AppError::malformed(format!(
                "'{}': missing required column `{}` (or `{}`)",
                path.display(),
                names[0],
                names[1..].join("`, `")
            ))
        })
}

fn get_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| !MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)))
}
