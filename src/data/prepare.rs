//! Canonical table → model-ready series.

use std::path::Path;

use tracing::{debug, info};

use crate::domain::{PreparedRow, PreparedSeries, PriceTable};
use crate::error::AppError;
use crate::io::{read_price_table, write_prepared_csv};

/// Load a canonical (or already prepared) CSV.
pub fn load(path: &Path) -> Result<PriceTable, AppError> {
    let table = read_price_table(path)?;
    debug!(path = %path.display(), rows = table.len(), "table loaded");
    Ok(table)
}

/// Rename to `unique_id, ds, y`, sort ascending by date, drop incomplete rows.
///
/// The sort is stable: rows sharing a date keep their input order and rows
/// without a date sort last (and are then dropped). The input is not modified.
pub fn preprocess(table: &PriceTable) -> PreparedSeries {
    let mut rows: Vec<_> = table.rows.iter().collect();
    rows.sort_by_key(|r| (r.date.is_none(), r.date));

    let prepared: Vec<PreparedRow> = rows
        .into_iter()
        .filter_map(|r| {
            Some(PreparedRow {
                unique_id: r.id.clone()?,
                ds: r.date?,
                y: r.price.filter(|v| v.is_finite())?,
            })
        })
        .collect();

    let dropped = table.len() - prepared.len();
    if dropped > 0 {
        info!(dropped, kept = prepared.len(), "rows with missing values dropped");
    }
    PreparedSeries { rows: prepared }
}

/// `load` then `preprocess`.
pub fn load_prepared(path: &Path) -> Result<PreparedSeries, AppError> {
    Ok(preprocess(&load(path)?))
}

pub fn write_prepared(path: &Path, series: &PreparedSeries) -> Result<(), AppError> {
    write_prepared_csv(path, series)
}
