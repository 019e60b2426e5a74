//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import) so the runner can swap implementations and tests can use files.

use super::feed::BarFeed;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("data unavailable from {origin}: {reason}")]
    DataUnavailable { origin: String, reason: String },

    #[error("schema error in {origin}: missing {missing}")]
    Schema { origin: String, missing: String },

    #[error("bar {index}: date {current} does not follow {previous}")]
    NonMonotonic {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("bar {index} ({date}): invalid {field} value {value}")]
    InvalidValue {
        index: usize,
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },

    #[error("row {row}: cannot parse {column} from '{value}'")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },
}

impl FeedError {
    pub fn unavailable(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        FeedError::DataUnavailable {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

/// What to load: one symbol over an optional half-open date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRequest {
    pub symbol: String,
    /// Inclusive.
    pub start: Option<NaiveDate>,
    /// Exclusive.
    pub end: Option<NaiveDate>,
}

impl FeedRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start: None,
            end: None,
        }
    }

    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date < e)
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for bar feed sources.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Load daily bars for the request and validate them into a feed.
    fn fetch(&self, request: &FeedRequest) -> Result<BarFeed, FeedError>;
}
