//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - written to CSV / persisted with the model
//! - reloaded later for forecasting and reporting

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The one commodity benchmark tracked by this tool.
pub const BRENT_SERIES: &str = "Europe Brent Spot Price FOB (Dollars per Barrel)";

/// Non-seasonal ARIMA order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct Order {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl Order {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl From<[usize; 3]> for Order {
    fn from([p, d, q]: [usize; 3]) -> Self {
        Self { p, d, q }
    }
}

impl From<Order> for [usize; 3] {
    fn from(o: Order) -> Self {
        [o.p, o.d, o.q]
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Seasonal order `(P, D, Q, s)`; `s` is the seasonal period length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 4]", into = "[usize; 4]")]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub s: usize,
}

impl SeasonalOrder {
    pub const fn new(p: usize, d: usize, q: usize, s: usize) -> Self {
        Self { p, d, q, s }
    }

    /// `(0, 0, 0, 0)`: no seasonal component.
    pub const fn none() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn is_active(self) -> bool {
        self.p + self.d + self.q > 0
    }
}

impl From<[usize; 4]> for SeasonalOrder {
    fn from([p, d, q, s]: [usize; 4]) -> Self {
        Self { p, d, q, s }
    }
}

impl From<SeasonalOrder> for [usize; 4] {
    fn from(o: SeasonalOrder) -> Self {
        [o.p, o.d, o.q, o.s]
    }
}

impl std::fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.p, self.d, self.q, self.s)
    }
}

/// Deterministic trend term added to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Trend {
    /// No trend.
    #[serde(rename = "n")]
    #[value(name = "n")]
    None,
    /// Intercept (drift once the series is differenced).
    #[serde(rename = "c")]
    #[value(name = "c")]
    Constant,
    /// Linear time trend.
    #[serde(rename = "t")]
    #[value(name = "t")]
    Linear,
    /// Intercept plus linear time trend.
    #[serde(rename = "ct")]
    #[value(name = "ct")]
    ConstantLinear,
}

impl Trend {
    pub fn has_constant(self) -> bool {
        matches!(self, Trend::Constant | Trend::ConstantLinear)
    }

    pub fn has_linear(self) -> bool {
        matches!(self, Trend::Linear | Trend::ConstantLinear)
    }

    /// Number of trend coefficients estimated.
    pub fn param_count(self) -> usize {
        usize::from(self.has_constant()) + usize::from(self.has_linear())
    }

    pub fn code(self) -> &'static str {
        match self {
            Trend::None => "n",
            Trend::Constant => "c",
            Trend::Linear => "t",
            Trend::ConstantLinear => "ct",
        }
    }
}

/// A normalized price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: String,
    pub date: NaiveDate,
    pub price: f64,
}

/// A row of the canonical table as loaded from disk.
///
/// Any cell may be missing (empty, `NaN`, or unparseable).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceRow {
    pub id: Option<String>,
    pub date: Option<NaiveDate>,
    pub price: Option<f64>,
}

impl From<&PriceRecord> for PriceRow {
    fn from(r: &PriceRecord) -> Self {
        Self {
            id: Some(r.id.clone()),
            date: Some(r.date),
            price: Some(r.price),
        }
    }
}

/// The canonical series table: `id, date, price`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<&[PriceRecord]> for PriceTable {
    fn from(records: &[PriceRecord]) -> Self {
        Self {
            rows: records.iter().map(PriceRow::from).collect(),
        }
    }
}

/// A model-ready observation: `unique_id, ds, y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedRow {
    pub unique_id: String,
    pub ds: NaiveDate,
    pub y: f64,
}

/// Ascending-by-`ds`, complete series.
///
/// The positional index of a row is its position in `rows` (zero-based,
/// contiguous).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreparedSeries {
    pub rows: Vec<PreparedRow>,
}

impl PreparedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `y` column.
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.y).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.ds)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.ds)
    }

    /// Back to the canonical column set (used to re-run preprocessing).
    pub fn to_table(&self) -> PriceTable {
        PriceTable {
            rows: self
                .rows
                .iter()
                .map(|r| PriceRow {
                    id: Some(r.unique_id.clone()),
                    date: Some(r.ds),
                    price: Some(r.y),
                })
                .collect(),
        }
    }
}

/// One dated point forecast (predicted mean).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Multi-step forecast, one point per step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Date the predicted means on the calendar days following `last_date`.
    pub fn daily_after(last_date: NaiveDate, values: &[f64]) -> Self {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| ForecastPoint {
                date: last_date + Duration::days(i as i64 + 1),
                value,
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}
