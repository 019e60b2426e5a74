//! BarFeed: an immutable, validated, restartable sequence of bars.

use super::provider::FeedError;
use crate::domain::{Bar, DatasetHash};
use chrono::NaiveDate;
use std::sync::Arc;

/// Chronologically ordered bars for one instrument.
///
/// Construction validates the whole series once; afterwards the feed is
/// read-only and cheap to clone, so every strategy run can replay it
/// independently from the first bar.
#[derive(Debug, Clone)]
pub struct BarFeed {
    symbol: String,
    bars: Arc<[Bar]>,
}

impl BarFeed {
    /// Validate and wrap `bars`.
    ///
    /// Rejects an empty series, dates that are not strictly increasing, and
    /// any price or volume that is NaN, infinite, or negative.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, FeedError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(FeedError::unavailable(symbol, "no bars in requested range"));
        }
        for (index, bar) in bars.iter().enumerate() {
            if let Some((field, value)) = bar.first_invalid_field() {
                return Err(FeedError::InvalidValue {
                    index,
                    date: bar.date,
                    field,
                    value,
                });
            }
            if index > 0 && bar.date <= bars[index - 1].date {
                return Err(FeedError::NonMonotonic {
                    index,
                    previous: bars[index - 1].date,
                    current: bar.date,
                });
            }
        }
        Ok(Self {
            symbol,
            bars: bars.into(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed feed; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Iterate from the first bar. Each call starts over.
    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The first `len` bars as a new feed.
    pub fn truncated(&self, len: usize) -> Result<Self, FeedError> {
        let len = len.min(self.bars.len());
        Self::new(self.symbol.clone(), self.bars[..len].to_vec())
    }

    /// BLAKE3 hash over the symbol and every bar field, in order.
    pub fn content_hash(&self) -> DatasetHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for bar in self.bars.iter() {
            hasher.update(bar.date.to_string().as_bytes());
            for (_, value) in bar.fields() {
                hasher.update(&value.to_le_bytes());
            }
        }
        DatasetHash(hasher.finalize().to_hex().to_string())
    }
}

impl<'a> IntoIterator for &'a BarFeed {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
            1_000.0,
        )
    }

    #[test]
    fn empty_feed_is_rejected() {
        let err = BarFeed::new("XU100", vec![]).unwrap_err();
        assert!(matches!(err, FeedError::DataUnavailable { .. }));
    }

    #[test]
    fn duplicate_date_is_rejected() {
        let err = BarFeed::new("XU100", vec![bar(2, 10.0), bar(2, 11.0)]).unwrap_err();
        assert!(matches!(err, FeedError::NonMonotonic { index: 1, .. }));
    }

    #[test]
    fn nan_close_is_rejected_with_position() {
        let err = BarFeed::new("XU100", vec![bar(2, 10.0), bar(3, f64::NAN)]).unwrap_err();
        match err {
            FeedError::InvalidValue { index, field, .. } => {
                assert_eq!(index, 1);
                assert_eq!(field, "open");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn iteration_restarts_from_first_bar() {
        let feed = BarFeed::new("XU100", vec![bar(2, 10.0), bar(3, 11.0), bar(4, 12.0)]).unwrap();
        let first: Vec<f64> = feed.iter().map(|b| b.close).collect();
        let second: Vec<f64> = (&feed).into_iter().map(|b| b.close).collect();
        assert_eq!(first, vec![10.0, 11.0, 12.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn clone_shares_bars() {
        let feed = BarFeed::new("XU100", vec![bar(2, 10.0)]).unwrap();
        let copy = feed.clone();
        assert!(std::ptr::eq(feed.bars().as_ptr(), copy.bars().as_ptr()));
    }

    #[test]
    fn content_hash_is_stable_and_sensitive() {
        let a = BarFeed::new("XU100", vec![bar(2, 10.0), bar(3, 11.0)]).unwrap();
        let b = BarFeed::new("XU100", vec![bar(2, 10.0), bar(3, 11.0)]).unwrap();
        let c = BarFeed::new("XU100", vec![bar(2, 10.0), bar(3, 11.5)]).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn truncated_keeps_prefix() {
        let feed = BarFeed::new("XU100", vec![bar(2, 10.0), bar(3, 11.0), bar(4, 12.0)]).unwrap();
        let head = feed.truncated(2).unwrap();
        assert_eq!(head.len(), 2);
        assert_eq!(head.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }
}
