//! Reporting utilities: price summary statistics and formatted terminal output.

pub mod format;

pub use format::*;

use chrono::{Duration, NaiveDate};

use crate::domain::PreparedSeries;

/// Recent-price snapshot of a prepared series.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSummary {
    pub last_date: NaiveDate,
    pub last_price: f64,
    pub previous_price: Option<f64>,
    /// Percent change from the previous observation.
    pub day_change_pct: Option<f64>,
    /// Price observed exactly 365 days before `last_date`, if any.
    pub year_ago_price: Option<f64>,
    pub year_change_pct: Option<f64>,
}

/// Summarize the most recent observations. `None` for an empty series.
pub fn price_summary(series: &PreparedSeries) -> Option<PriceSummary> {
    let last = series.rows.last()?;
    let previous_price = series.rows.len().checked_sub(2).map(|i| series.rows[i].y);

    let year_ago = last.ds - Duration::days(365);
    let year_ago_price = series.rows.iter().find(|r| r.ds == year_ago).map(|r| r.y);

    Some(PriceSummary {
        last_date: last.ds,
        last_price: last.y,
        previous_price,
        day_change_pct: previous_price.and_then(|p| pct_change(p, last.y)),
        year_ago_price,
        year_change_pct: year_ago_price.and_then(|p| pct_change(p, last.y)),
    })
}

fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PreparedRow;

    fn row(ds: NaiveDate, y: f64) -> PreparedRow {
        PreparedRow {
            unique_id: "brent".into(),
            ds,
            y,
        }
    }

    #[test]
    fn summary_uses_previous_row_and_exact_year_ago_date() {
        let last = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let series = PreparedSeries {
            rows: vec![
                row(last - Duration::days(365), 80.0),
                row(last - Duration::days(3), 71.0),
                row(last, 72.0),
            ],
        };
        let s = price_summary(&series).unwrap();
        assert_eq!(s.last_price, 72.0);
        assert_eq!(s.previous_price, Some(71.0));
        assert!((s.day_change_pct.unwrap() - 1.408450704).abs() < 1e-6);
        assert_eq!(s.year_ago_price, Some(80.0));
        assert!((s.year_change_pct.unwrap() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn single_row_has_no_changes() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let s = price_summary(&PreparedSeries { rows: vec![row(d, 75.0)] }).unwrap();
        assert_eq!(s.previous_price, None);
        assert_eq!(s.day_change_pct, None);
        assert_eq!(s.year_ago_price, None);
        assert!(price_summary(&PreparedSeries::default()).is_none());
    }
}
