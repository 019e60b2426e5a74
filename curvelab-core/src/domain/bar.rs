//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV observation for a single instrument.
///
/// Prices are adjusted upstream by the data provider; every calculation in the
/// engine reads these columns as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Named numeric fields in column order.
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
    }

    /// First field that is NaN, infinite, or negative.
    pub fn first_invalid_field(&self) -> Option<(&'static str, f64)> {
        self.fields()
            .into_iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
    }
}
