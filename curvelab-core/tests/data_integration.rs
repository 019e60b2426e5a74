//! CSV provider against real files on disk, through to a full run.

use chrono::NaiveDate;
use curvelab_core::data::{CsvProvider, DataProvider};
use curvelab_core::{Backtest, EngineError, FeedError, FeedRequest, RunConfig, StrategySpec};
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_csv(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn sample_csv(days: usize) -> String {
    let mut text = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    let start = date(2024, 1, 1);
    for i in 0..days {
        let close = 100.0 + (i as f64 * 0.4).sin() * 5.0;
        let d = start + chrono::Duration::days(i as i64);
        text.push_str(&format!(
            "{d},{o:.4},{h:.4},{l:.4},{c:.4},{c:.4},{v}\n",
            o = close - 0.2,
            h = close + 1.0,
            l = close - 1.0,
            c = close,
            v = 1_000 + i
        ));
    }
    text
}

#[test]
fn csv_feed_loads_and_runs() {
    let file = write_csv(&sample_csv(60));
    let provider = CsvProvider::new(file.path());
    let request = FeedRequest::new("SINE");

    let feed = provider.fetch(&request).unwrap();
    assert_eq!(feed.len(), 60);
    assert_eq!(feed.symbol(), "SINE");
    assert_eq!(feed.first_date(), date(2024, 1, 1));

    let backtest = Backtest::new(
        "MA Direction",
        StrategySpec::MaDirection { period: 5, stake: 2 },
        RunConfig::default(),
    )
    .unwrap();
    let result = backtest.run_from(&provider, &request).unwrap();
    assert_eq!(result.bar_count, 60);
    assert!(!result.trades.is_empty());
    assert_eq!(result.dataset_hash, feed.content_hash());
}

#[test]
fn date_range_is_half_open() {
    let file = write_csv(&sample_csv(30));
    let request =
        FeedRequest::new("SINE").with_range(Some(date(2024, 1, 5)), Some(date(2024, 1, 10)));
    let feed = CsvProvider::new(file.path()).fetch(&request).unwrap();
    assert_eq!(feed.len(), 5);
    assert_eq!(feed.first_date(), date(2024, 1, 5));
    assert_eq!(feed.last_date(), date(2024, 1, 9));
}

#[test]
fn empty_range_is_data_unavailable() {
    let file = write_csv(&sample_csv(10));
    let request = FeedRequest::new("SINE").with_range(Some(date(2030, 1, 1)), None);
    let err = CsvProvider::new(file.path()).fetch(&request).unwrap_err();
    assert!(matches!(err, FeedError::DataUnavailable { .. }));
}

#[test]
fn missing_column_is_schema_error() {
    let file = write_csv("Date,Open,High,Close\n2024-01-02,1,2,1.5\n");
    let err = CsvProvider::new(file.path())
        .fetch(&FeedRequest::new("X"))
        .unwrap_err();
    match err {
        FeedError::Schema { missing, .. } => assert!(missing.contains("low")),
        other => panic!("expected Schema, got {other:?}"),
    }
}

#[test]
fn unsorted_rows_are_rejected() {
    let file = write_csv(
        "Date,Open,High,Low,Close\n\
         2024-01-03,1,2,0.5,1.5\n\
         2024-01-02,1,2,0.5,1.5\n",
    );
    let err = CsvProvider::new(file.path())
        .fetch(&FeedRequest::new("X"))
        .unwrap_err();
    assert!(matches!(err, FeedError::NonMonotonic { index: 1, .. }));
}

#[test]
fn negative_price_is_rejected() {
    let file = write_csv("Date,Open,High,Low,Close\n2024-01-02,1,2,-0.5,1.5\n");
    let err = CsvProvider::new(file.path())
        .fetch(&FeedRequest::new("X"))
        .unwrap_err();
    assert!(matches!(err, FeedError::InvalidValue { field: "low", .. }));
}

#[test]
fn missing_file_surfaces_through_engine() {
    let provider = CsvProvider::new("/nonexistent/curvelab/bars.csv");
    let backtest = Backtest::new(
        "Lowess",
        StrategySpec::Lowess {
            fraction: 0.5,
            stake: 1,
        },
        RunConfig::default(),
    )
    .unwrap();
    let err = backtest.run_from(&provider, &FeedRequest::new("X")).unwrap_err();
    assert!(matches!(err, EngineError::Feed(FeedError::Io(_))));
}
