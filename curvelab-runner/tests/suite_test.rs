//! Integration tests for the runner: config file → feed → suite → artifacts.

use std::io::Write;
use std::path::Path;

use curvelab_runner::{
    run_config, save_artifacts, BacktestConfig, LoadOptions, RunError, SourceKind,
};
use tempfile::TempDir;

/// Weekday-free daily series: a slow sine with a drift, enough bars for
/// every strategy to trade.
fn write_fixture_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("bars.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
    let start = chrono::NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut prev = 100.0_f64;
    for i in 0..160 {
        let close = 100.0 + 0.05 * i as f64 + 8.0 * (i as f64 / 9.0).sin();
        let date = start + chrono::Duration::days(i);
        writeln!(
            file,
            "{date},{:.4},{:.4},{:.4},{:.4},{}",
            prev,
            prev.max(close) + 0.5,
            prev.min(close) - 0.5,
            close,
            10_000 + i
        )
        .unwrap();
        prev = close;
    }
    path
}

fn write_config(dir: &Path, csv: &Path) -> std::path::PathBuf {
    let text = format!(
        r#"
[data]
source = "csv"
symbol = "FIXTURE"
path = "{}"

[broker]
initial_cash = 10000.0
commission_rate = 0.001

[output]
directory = "{}"

[[strategies]]
name = "EMA Crossover"
kind = "ema_crossover"
fast_period = 5
slow_period = 15
stake = 10

[[strategies]]
name = "MA Direction"
kind = "ma_direction"
period = 10
stake = 10

[[strategies]]
name = "HP Filter"
kind = "hp_filter"
lambda = 1600
stake = 10

[[strategies]]
name = "Lowess"
kind = "lowess"
fraction = 0.2
stake = 10
"#,
        csv.display().to_string().replace('\\', "/"),
        dir.join("out").display().to_string().replace('\\', "/"),
    );
    let path = dir.join("suite.toml");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn csv_suite_runs_and_writes_artifacts() {
    let dir = TempDir::new().unwrap();
    let csv = write_fixture_csv(dir.path());
    let config = BacktestConfig::from_file(&write_config(dir.path(), &csv)).unwrap();

    let suite = run_config(&config, &LoadOptions::default()).unwrap();
    assert!(!suite.has_synthetic);
    assert_eq!(suite.runs.len(), 4);
    for run in &suite.runs {
        assert_eq!(run.result.bar_count, 160);
        assert_eq!(run.summary.starting_value, 10_000.0);
        assert!(run.result.fills.len() > 0, "{} never traded", run.name);
    }

    let written = save_artifacts(&suite, &config.output.directory).unwrap();
    assert_eq!(written.len(), 4 * 2 + 1);
    for path in &written {
        assert!(path.exists(), "missing {}", path.display());
    }

    let json = std::fs::read_to_string(config.output.directory.join("hp_filter.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["schema_version"], 1);
    assert_eq!(value["name"], "HP Filter");
    assert_eq!(value["result"]["spec"]["kind"], "hp_filter");
    assert_eq!(value["result"]["equity"]["points"].as_array().unwrap().len(), 160);

    let curves_path = config.output.directory.join("equity_curves.csv");
    let curves = std::fs::read_to_string(curves_path).unwrap();
    let mut lines = curves.lines();
    assert_eq!(
        lines.next().unwrap(),
        "date,EMA Crossover,MA Direction,HP Filter,Lowess"
    );
    assert_eq!(lines.count(), 160);
}

#[test]
fn suite_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let csv = write_fixture_csv(dir.path());
    let config = BacktestConfig::from_file(&write_config(dir.path(), &csv)).unwrap();

    let a = run_config(&config, &LoadOptions::default()).unwrap();
    let b = run_config(&config, &LoadOptions::default()).unwrap();
    for (x, y) in a.runs.iter().zip(&b.runs) {
        assert_eq!(x.result, y.result);
        assert_eq!(x.summary, y.summary);
    }
    assert_eq!(a.curves, b.curves);
}

#[test]
fn missing_data_is_reported_not_synthesized() {
    let dir = TempDir::new().unwrap();
    let mut config = BacktestConfig::reference();
    config.data.source = SourceKind::Csv;
    config.data.path = Some(dir.path().join("absent.csv"));
    // LOWESS refits the whole history every bar; keep the fallback feed short.
    config.data.start = chrono::NaiveDate::from_ymd_opt(2023, 1, 1);
    config.data.end = chrono::NaiveDate::from_ymd_opt(2023, 4, 1);

    let err = run_config(&config, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RunError::Data(_)));

    let suite = run_config(
        &config,
        &LoadOptions {
            synthetic_fallback: true,
        },
    )
    .unwrap();
    assert!(suite.has_synthetic);
    // Weekdays in [2023-01-01, 2023-04-01).
    assert_eq!(suite.runs[0].result.bar_count, 65);
}

#[test]
fn indicator_failure_names_the_strategy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("huge.csv");
    let mut text = String::from("Date,Open,High,Low,Close\n");
    for day in 1..=20 {
        text.push_str(&format!("2024-01-{day:02},1e308,1e308,1e308,1e308\n"));
    }
    std::fs::write(&path, text).unwrap();

    let mut config = BacktestConfig::reference();
    config.data.source = SourceKind::Csv;
    config.data.path = Some(path);
    config.data.start = None;
    config.data.end = None;
    config.broker.max_indicator_failures = 5;

    match run_config(&config, &LoadOptions::default()).unwrap_err() {
        RunError::Strategy { name, .. } => assert_eq!(name, "HP Filter"),
        other => panic!("expected Strategy error, got {other}"),
    }
}
