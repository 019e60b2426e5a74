//! Feed loading for the runner.
//!
//! Resolves a [`DataConfig`] to a validated [`BarFeed`]:
//! 1. `csv` → read the configured file
//! 2. `yahoo` → download from the chart API
//! 3. `synthetic` → generate a seeded random walk
//! 4. If 1 or 2 fails and `synthetic_fallback` is set → generate synthetic bars (tagged)
//! 5. Otherwise → fail with the provider's error
//!
//! Synthetic data is a developer-only offline mode. Results produced on it
//! are tagged so they are never mistaken for market data.

use chrono::{Datelike, NaiveDate};
use curvelab_core::data::{CsvProvider, DataProvider, DataSource, YahooProvider};
use curvelab_core::{Bar, BarFeed, FeedError, FeedRequest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::config::{DataConfig, SourceKind};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{provider} feed for '{symbol}' failed: {source} (use --synthetic for synthetic data)")]
    Provider {
        provider: String,
        symbol: String,
        source: FeedError,
    },

    #[error("data.path is required for csv source")]
    MissingPath,
}

/// Options controlling how a feed is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Replace a failed csv/yahoo load with synthetic bars.
    pub synthetic_fallback: bool,
}

/// A feed plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedFeed {
    pub feed: BarFeed,
    pub source: DataSource,
}

impl LoadedFeed {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Load the feed described by `data`.
pub fn load_feed(data: &DataConfig, opts: &LoadOptions) -> Result<LoadedFeed, LoadError> {
    let request = data.request();
    let provider: Box<dyn DataProvider> = match data.source {
        SourceKind::Synthetic => Box::new(SyntheticProvider::default()),
        SourceKind::Csv => {
            let path = data.path.as_ref().ok_or(LoadError::MissingPath)?;
            let mut csv = CsvProvider::new(path);
            if let Some(format) = &data.date_format {
                csv = csv.with_date_format(format.clone());
            }
            Box::new(csv)
        }
        SourceKind::Yahoo => match YahooProvider::new() {
            Ok(yahoo) => Box::new(yahoo.with_interval(data.timeframe.clone())),
            Err(err) => return fallback(data, &request, "yahoo", err, opts),
        },
    };

    match provider.fetch(&request) {
        Ok(feed) => {
            tracing::info!(
                provider = provider.name(),
                symbol = %request.symbol,
                bars = feed.len(),
                start = %feed.first_date(),
                end = %feed.last_date(),
                "feed loaded"
            );
            Ok(LoadedFeed {
                feed,
                source: provider.source(),
            })
        }
        Err(err) => fallback(data, &request, provider.name(), err, opts),
    }
}

fn fallback(
    data: &DataConfig,
    request: &FeedRequest,
    provider: &str,
    err: FeedError,
    opts: &LoadOptions,
) -> Result<LoadedFeed, LoadError> {
    if !opts.synthetic_fallback || data.source == SourceKind::Synthetic {
        return Err(LoadError::Provider {
            provider: provider.to_string(),
            symbol: data.symbol.clone(),
            source: err,
        });
    }
    tracing::warn!(
        provider,
        symbol = %data.symbol,
        error = %err,
        "generating synthetic data; results will be tagged as synthetic"
    );
    let synthetic = SyntheticProvider::default();
    let feed = synthetic.fetch(request).map_err(|source| LoadError::Provider {
        provider: synthetic.name().to_string(),
        symbol: data.symbol.clone(),
        source,
    })?;
    Ok(LoadedFeed {
        feed,
        source: DataSource::Synthetic,
    })
}

/// Seeded random-walk bars on weekdays.
///
/// The seed is the BLAKE3 hash of the symbol, so the same symbol and range
/// always produce the same feed.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    /// Used when the request has no start date.
    pub default_start: NaiveDate,
    /// Calendar days generated when the request has no end date.
    pub default_span_days: i64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            default_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            default_span_days: 5 * 365,
        }
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, request: &FeedRequest) -> Result<BarFeed, FeedError> {
        let start = request.start.unwrap_or(self.default_start);
        let end = request
            .end
            .unwrap_or(start + chrono::Duration::days(self.default_span_days));
        BarFeed::new(request.symbol.clone(), generate_synthetic_bars(&request.symbol, start, end))
    }
}

/// Weekday bars in `[start, end)` following a ±3% daily random walk from 100.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current < end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar::new(current, open, high, low, close, volume));

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
