//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API, retrying transient
//! failures with exponential backoff. When an adjusted close series is
//! present, every OHLC price of a bar is scaled by `adjclose / close` so the
//! whole bar is on the adjusted basis.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. The CSV import path is the fallback when Yahoo is unavailable.

use super::feed::BarFeed;
use super::provider::{DataProvider, DataSource, FeedError, FeedRequest};
use crate::domain::Bar;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;

const CHART_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

fn schema(symbol: &str, missing: &str) -> FeedError {
    FeedError::Schema {
        origin: format!("yahoo:{symbol}"),
        missing: missing.to_string(),
    }
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    interval: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new() -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        Ok(Self {
            client,
            interval: "1d".to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Bar interval passed to the chart API, e.g. `1d` or `1wk`.
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    fn chart_url(symbol: &str) -> String {
        // Index symbols such as ^XU100 carry a caret that must be escaped in the path.
        format!("{CHART_ENDPOINT}/{}", symbol.replace('^', "%5E"))
    }

    fn period_bounds(request: &FeedRequest) -> (i64, i64) {
        let to_ts = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        let start = request.start.and_then(to_ts).unwrap_or(0);
        let end = request
            .end
            .and_then(to_ts)
            .unwrap_or_else(|| Utc::now().timestamp());
        (start, end)
    }

    /// Parse the chart API response into bars.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, FeedError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                FeedError::unavailable(symbol, format!("{}: {}", err.code, err.description))
            } else {
                FeedError::unavailable(symbol, "empty result with no error")
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| schema(symbol, "result array is empty"))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| schema(symbol, "no timestamps"))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| schema(symbol, "no quote data"))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    schema(symbol, &format!("valid timestamp (got {ts})"))
                })?;

            let at = |col: &Vec<Option<f64>>| col.get(i).copied().flatten();
            let (Some(open), Some(high), Some(low), Some(close)) =
                (at(&quote.open), at(&quote.high), at(&quote.low), at(&quote.close))
            else {
                // Holidays and halted sessions come back as null rows.
                tracing::debug!(%symbol, %date, "skipping incomplete bar");
                continue;
            };
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0) as f64;

            let ratio = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten())
                .filter(|_| close != 0.0)
                .map_or(1.0, |adj| adj / close);

            bars.push(Bar::new(
                date,
                open * ratio,
                high * ratio,
                low * ratio,
                close * ratio,
                volume,
            ));
        }

        if bars.is_empty() {
            return Err(FeedError::unavailable(symbol, "no complete bars in response"));
        }

        Ok(bars)
    }

    /// Execute the chart request with retry.
    fn fetch_with_retry(&self, request: &FeedRequest) -> Result<Vec<Bar>, FeedError> {
        let url = Self::chart_url(&request.symbol);
        let (period1, period2) = Self::period_bounds(request);
        let query = [
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", self.interval.clone()),
            ("includeAdjustedClose", "true".to_string()),
        ];
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(symbol = %request.symbol, attempt, ?delay, "retrying yahoo request");
                std::thread::sleep(delay);
            }

            match self.client.get(&url).query(&query).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(FeedError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(FeedError::unavailable(&request.symbol, "symbol not found"));
                    }

                    if !status.is_success() {
                        last_error = Some(FeedError::Network(format!(
                            "HTTP {status} for {}",
                            request.symbol
                        )));
                        continue;
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        schema(&request.symbol, &format!("chart JSON ({e})"))
                    })?;

                    return Self::parse_response(&request.symbol, chart);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(FeedError::Network(e.to_string()));
                        continue;
                    }
                    return Err(FeedError::Network(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FeedError::Network("max retries exceeded".into())))
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch(&self, request: &FeedRequest) -> Result<BarFeed, FeedError> {
        let bars: Vec<Bar> = self
            .fetch_with_retry(request)?
            .into_iter()
            .filter(|b| request.contains(b.date))
            .collect();
        tracing::info!(symbol = %request.symbol, bars = bars.len(), "fetched from yahoo");
        BarFeed::new(request.symbol.clone(), bars)
    }
}
