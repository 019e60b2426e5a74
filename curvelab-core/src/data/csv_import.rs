//! CSV import provider.
//!
//! Accepts any header order. Column names are matched case-insensitively;
//! an adjusted close column ("Adj Close", "adj_close", "adjclose") wins over
//! a plain "Close" when both are present. Volume is optional and defaults
//! to zero.

use super::feed::BarFeed;
use super::provider::{DataProvider, DataSource, FeedError, FeedRequest};
use crate::domain::Bar;
use chrono::NaiveDate;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_ALIASES: &[&str] = &["date", "datetime", "timestamp", "time"];
const ADJ_CLOSE_ALIASES: &[&str] = &["adj close", "adjclose", "adjusted close"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

fn normalize(header: &str) -> String {
    header.trim().to_ascii_lowercase().replace('_', " ")
}

fn resolve_columns(source: &str, headers: &csv::StringRecord) -> Result<ColumnMap, FeedError> {
    let names: Vec<String> = headers.iter().map(normalize).collect();
    let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));
    let require = |column: &str, aliases: &[&str]| {
        find(aliases).ok_or_else(|| FeedError::Schema {
            origin: source.to_string(),
            missing: format!(
                "column '{column}' (found: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
        })
    };

    let close = match find(ADJ_CLOSE_ALIASES) {
        Some(i) => i,
        None => require("close", &["close"])?,
    };

    Ok(ColumnMap {
        date: require("date", DATE_ALIASES)?,
        open: require("open", &["open"])?,
        high: require("high", &["high"])?,
        low: require("low", &["low"])?,
        close,
        volume: find(&["volume"]),
    })
}

/// Parse a date with `format`, falling back to the leading date part of a
/// datetime such as `2020-01-02 00:00:00` or `2020-01-02T00:00:00Z`.
fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, format).ok().or_else(|| {
        let head = raw.split(|c: char| c == ' ' || c == 'T').next()?;
        NaiveDate::parse_from_str(head, format).ok()
    })
}

fn parse_number(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<f64, FeedError> {
    let raw = record.get(idx).unwrap_or("");
    raw.parse::<f64>().map_err(|_| FeedError::Parse {
        row,
        column,
        value: raw.to_string(),
    })
}

/// Loads bars from a delimited text file.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
    date_format: String,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse CSV text from any reader. Rows outside the requested range are skipped.
    pub fn read_bars<R: Read>(
        &self,
        reader: R,
        request: &FeedRequest,
    ) -> Result<Vec<Bar>, FeedError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let source = self.path.display().to_string();
        let columns = resolve_columns(&source, rdr.headers()?)?;

        let mut bars = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            // 1-based, counting the header line
            let row = i + 2;
            let raw_date = record.get(columns.date).unwrap_or("");
            let date = parse_date(raw_date, &self.date_format).ok_or_else(|| FeedError::Parse {
                row,
                column: "date",
                value: raw_date.to_string(),
            })?;
            if !request.contains(date) {
                continue;
            }

            let volume = match columns.volume {
                Some(idx) if !record.get(idx).unwrap_or("").is_empty() => {
                    parse_number(&record, idx, row, "volume")?
                }
                _ => 0.0,
            };

            bars.push(Bar::new(
                date,
                parse_number(&record, columns.open, row, "open")?,
                parse_number(&record, columns.high, row, "high")?,
                parse_number(&record, columns.low, row, "low")?,
                parse_number(&record, columns.close, row, "close")?,
                volume,
            ));
        }
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(&self, request: &FeedRequest) -> Result<BarFeed, FeedError> {
        let file = std::fs::File::open(&self.path)?;
        let bars = self.read_bars(file, request)?;
        tracing::debug!(
            path = %self.path.display(),
            symbol = %request.symbol,
            bars = bars.len(),
            "loaded csv"
        );
        BarFeed::new(request.symbol.clone(), bars)
    }
}
