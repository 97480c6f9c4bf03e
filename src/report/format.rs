//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model and data code stays free of presentation concerns
//! - output changes are localized (important for future snapshot tests)

use crate::data::{AcquisitionReport, NormalizeReport};
use crate::domain::{Forecast, PreparedSeries};
use crate::models::FitSummary;
use crate::report::PriceSummary;

/// First `n` rows of a prepared series plus its span.
pub fn format_series_head(series: &PreparedSeries, n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>5} {:<24} {:<10} {:>10}\n", "", "unique_id", "ds", "y"));
    for (i, r) in series.rows.iter().take(n).enumerate() {
        out.push_str(&format!("{i:>5} {:<24} {:<10} {:>10.2}\n", truncate(&r.unique_id, 24), r.ds, r.y));
    }
    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!("[{} rows | {first} .. {last}]\n", series.len()));
        }
        _ => out.push_str("[0 rows]\n"),
    }
    out
}

/// Fitted model diagnostics.
pub fn format_fit_summary(summary: &FitSummary) -> String {
    let mut out = String::new();

    out.push_str("=== brent - SARIMA fit ===\n");
    out.push_str(&format!("Model: {}\n", summary.spec));
    out.push_str(&format!(
        "Sample: n={} (effective {}) | {} .. {}\n",
        summary.nobs, summary.nobs_effective, summary.first_date, summary.last_date
    ));
    out.push_str(&format!(
        "Log likelihood={:.3} AIC={:.3} BIC={:.3} iterations={}\n",
        summary.loglik, summary.aic, summary.bic, summary.iterations
    ));

    out.push_str("\nCoefficients:\n");
    for c in &summary.coefficients {
        out.push_str(&format!("  {:<10} {:>12.6}\n", c.name, c.value));
    }
    out
}

/// Recent price table: last date/value, 1-day and 1-year changes.
pub fn format_price_summary(s: &PriceSummary) -> String {
    let rows = [
        ("Last Date", s.last_date.to_string()),
        ("Last Value", format!("{:.2}", s.last_price)),
        ("Previous Day Price", fmt_opt(s.previous_price, |v| format!("{v:.2}"))),
        ("1-Day Change (%)", fmt_opt(s.day_change_pct, |v| format!("{v:.2}%"))),
        ("Price One Year Ago", fmt_opt(s.year_ago_price, |v| format!("{v:.2}"))),
        ("1-Year Change (%)", fmt_opt(s.year_change_pct, |v| format!("{v:.2}%"))),
    ];

    let mut out = String::from("Recent price summary:\n");
    out.push_str(&format!("{:<20} {:>12}\n", "Metric", "Value"));
    out.push_str(&format!("{:-<20} {:->12}\n", "", ""));
    for (metric, value) in rows {
        out.push_str(&format!("{metric:<20} {value:>12}\n"));
    }
    out
}

/// Dated forecast table.
pub fn format_forecast_table(forecast: &Forecast) -> String {
    let mut out = format!("Forecast for the next {} days:\n", forecast.len());
    out.push_str(&format!("{:<10} {:>14}\n", "date", "forecast_price"));
    out.push_str(&format!("{:-<10} {:->14}\n", "", ""));
    for p in &forecast.points {
        out.push_str(&format!("{:<10} {:>14.4}\n", p.date, p.value));
    }
    out
}

pub fn format_acquisition(report: &AcquisitionReport) -> String {
    let mut out = format!(
        "Fetched {}/{} years: {}\n",
        report.fetched.len(),
        report.requested.len(),
        fmt_years(&report.fetched)
    );
    if !report.failed.is_empty() {
        out.push_str(&format!("Failed (archived as null): {}\n", fmt_years(&report.failed)));
    }
    out
}

pub fn format_normalize(report: &NormalizeReport) -> String {
    let mut out = format!(
        "Organized {} rows ({} discarded) from {} archive slots ({} empty).\n",
        report.kept, report.discarded, report.slots, report.null_slots
    );
    if report.duplicate_dates > 0 {
        out.push_str(&format!("Warning: {} duplicate dates kept.\n", report.duplicate_dates));
    }
    out
}

fn fmt_opt(v: Option<f64>, f: impl Fn(f64) -> String) -> String {
    v.map(f).unwrap_or_else(|| "N/A".to_string())
}

fn fmt_years(years: &[i32]) -> String {
    if years.is_empty() {
        return "-".to_string();
    }
    years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn price_summary_shows_na_for_missing_year() {
        let s = PriceSummary {
            last_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            last_price: 72.0,
            previous_price: Some(71.0),
            day_change_pct: Some(1.408450704),
            year_ago_price: None,
            year_change_pct: None,
        };
        let text = format_price_summary(&s);
        assert!(text.contains("2025-03-10"));
        assert!(text.contains("1.41%"));
        assert_eq!(text.matches("N/A").count(), 2);
    }

    #[test]
    fn forecast_table_lists_each_day() {
        let last = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let text = format_forecast_table(&Forecast::daily_after(last, &[72.5, 72.75]));
        assert!(text.starts_with("Forecast for the next 2 days:"));
        assert!(text.contains("2025-03-11"));
        assert!(text.contains("72.7500"));
    }

    #[test]
    fn truncates_long_ids() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn acquisition_lists_failed_years() {
        let text = format_acquisition(&AcquisitionReport {
            requested: vec![2024, 2023],
            fetched: vec![2024],
            failed: vec![2023],
        });
        assert!(text.contains("1/2"));
        assert!(text.contains("Failed (archived as null): 2023"));
    }
}
