//! Raw archive → canonical price table.
//!
//! Each non-null archive slot is an API response of the form
//! `{"response": {"data": [{"series-description", "period", "value"}, ...]}}`.
//! Only records of the target series are kept, in archive order.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::PriceRecord;
use crate::error::AppError;
use crate::io::archive::json_kind;
use crate::io::{parse_date, read_archive, write_price_records};

/// Counters from a normalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizeReport {
    pub slots: usize,
    pub null_slots: usize,
    pub kept: usize,
    pub discarded: usize,
    /// Rows whose date was already seen earlier in the output.
    pub duplicate_dates: usize,
}

/// Extract the `target` series from an in-memory archive.
pub fn normalize_archive(
    archive: &[Option<Value>],
    target: &str,
) -> Result<(Vec<PriceRecord>, NormalizeReport), AppError> {
    let mut report = NormalizeReport {
        slots: archive.len(),
        ..NormalizeReport::default()
    };
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (slot, payload) in archive.iter().enumerate() {
        let Some(payload) = payload else {
            report.null_slots += 1;
            continue;
        };
        let data = payload
            .get("response")
            .and_then(|r| r.get("data"))
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::malformed(format!("archive slot {slot} has no `response.data` array")))?;

        for (i, entry) in data.iter().enumerate() {
            if entry.get("series-description").and_then(Value::as_str) != Some(target) {
                report.discarded += 1;
                continue;
            }
            let record = parse_record(entry, target)
                .map_err(|msg| AppError::malformed(format!("archive slot {slot}, record {i}: {msg}")))?;
            if !seen.insert(record.date) {
                report.duplicate_dates += 1;
            }
            records.push(record);
        }
    }

    report.kept = records.len();
    Ok((records, report))
}

/// Read the archive at `raw_path`, keep the Brent series, write `out_path`.
pub fn organize(raw_path: &Path, out_path: &Path, target: &str) -> Result<NormalizeReport, AppError> {
    let archive = read_archive(raw_path)?;
    let (records, report) = normalize_archive(&archive, target)?;

    if report.null_slots > 0 {
        warn!(null_slots = report.null_slots, "archive contains failed years; skipped");
    }
    if report.duplicate_dates > 0 {
        warn!(duplicates = report.duplicate_dates, "duplicate dates kept as-is");
    }

    write_price_records(out_path, &records)?;
    info!(
        path = %out_path.display(),
        rows = report.kept,
        discarded = report.discarded,
        "canonical table written"
    );
    Ok(report)
}

fn parse_record(entry: &Value, target: &str) -> Result<PriceRecord, String> {
    let period = entry
        .get("period")
        .and_then(Value::as_str)
        .ok_or("missing `period`")?;
    let date = parse_date(period).ok_or_else(|| format!("invalid period '{period}'"))?;

    let price = match entry.get("value") {
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| format!("invalid value '{s}'"))?,
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| format!("invalid value {n}"))?,
        Some(other) => return Err(format!("`value` is {}", json_kind(other))),
        None => return Err("missing `value`".to_string()),
    };

    Ok(PriceRecord {
        id: target.to_string(),
        date,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BRENT_SERIES;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;
    use serde_json::json;

    fn payload(records: Value) -> Option<Value> {
        Some(json!({ "response": { "data": records } }))
    }

    fn brent(period: &str, value: Value) -> Value {
        json!({ "series-description": BRENT_SERIES, "period": period, "value": value })
    }

    fn wti(period: &str) -> Value {
        json!({
            "series-description": "Cushing, OK WTI Spot Price FOB (Dollars per Barrel)",
            "period": period,
            "value": "70.00"
        })
    }

    #[test]
    fn keeps_only_matching_series_in_source_order() {
        let archive = vec![
            payload(json!([brent("2024-12-31", json!("74.64")), wti("2024-12-31"), brent("2024-12-30", json!(73.9))])),
            payload(json!([wti("2023-12-29"), brent("2023-12-29", json!("77.69"))])),
        ];
        let (records, report) = normalize_archive(&archive, BRENT_SERIES).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(report.kept, 3);
        assert_eq!(report.discarded, 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(records[1].price, 73.9);
        assert_eq!(records[2].price, 77.69);
        assert!(records.iter().all(|r| r.id == BRENT_SERIES));
    }

    #[test]
    fn null_slot_is_skipped() {
        let archive = vec![None, payload(json!([brent("2022-06-01", json!("120.5"))]))];
        let (records, report) = normalize_archive(&archive, BRENT_SERIES).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.null_slots, 1);
        assert_eq!(report.slots, 2);
    }

    #[test]
    fn missing_data_array_is_malformed() {
        let archive = vec![Some(json!({ "error": "API key invalid" }))];
        let err = normalize_archive(&archive, BRENT_SERIES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn unparseable_matching_value_is_malformed() {
        let archive = vec![payload(json!([brent("2024-01-02", json!("n/a"))]))];
        assert!(normalize_archive(&archive, BRENT_SERIES).is_err());
    }

    #[test]
    fn duplicate_dates_are_counted_not_removed() {
        let archive = vec![
            payload(json!([brent("2024-01-02", json!("75.0"))])),
            payload(json!([brent("2024-01-02", json!("75.0"))])),
        ];
        let (records, report) = normalize_archive(&archive, BRENT_SERIES).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(report.duplicate_dates, 1);
    }

    #[test]
    fn organize_writes_canonical_csv() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.json");
        let out = dir.path().join("processed").join("brent.csv");
        crate::io::write_archive(&raw, &[payload(json!([brent("2024-03-01T00:00:00", json!("81.5"))])), None])
            .unwrap();

        let report = organize(&raw, &out, BRENT_SERIES).unwrap();
        assert_eq!(report.kept, 1);
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text, format!("id,date,price\n{BRENT_SERIES},2024-03-01,81.5\n"));
    }
}
