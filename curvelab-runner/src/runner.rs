//! Suite runner: every configured strategy over one shared feed.
//!
//! Two entry points:
//! - `run_suite()`: takes a loaded feed, runs all strategies in parallel.
//! - `run_config()`: loads the feed described by the config, then runs the suite.

use curvelab_core::data::DataSource;
use curvelab_core::domain::DatasetHash;
use curvelab_core::{Backtest, BarFeed, EngineError, RunResult};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::align::{align_curves, AlignedCurves};
use crate::config::{BacktestConfig, ConfigError, StrategyEntry};
use crate::data_loader::{load_feed, LoadError, LoadOptions};
use crate::metrics::PerformanceSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] LoadError),

    #[error("strategy '{name}' failed: {source}")]
    Strategy { name: String, source: EngineError },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// One strategy's result plus its summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyRun {
    pub name: String,
    pub summary: PerformanceSummary,
    pub result: RunResult,
}

impl StrategyRun {
    fn new(name: &str, result: RunResult) -> Self {
        let summary =
            PerformanceSummary::compute(&result.equity, &result.trades, result.total_commission());
        Self {
            name: name.to_string(),
            summary,
            result,
        }
    }
}

/// Every run of a suite, in configuration order, with the aligned curves.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    pub schema_version: u32,
    pub symbol: String,
    pub source: DataSource,
    pub has_synthetic: bool,
    pub dataset_hash: DatasetHash,
    pub runs: Vec<StrategyRun>,
    pub curves: AlignedCurves,
}

impl SuiteResult {
    pub fn run(&self, name: &str) -> Option<&StrategyRun> {
        self.runs.iter().find(|r| r.name == name)
    }
}

fn run_entry(
    entry: &StrategyEntry,
    config: &BacktestConfig,
    feed: &BarFeed,
) -> Result<StrategyRun, RunError> {
    let strategy_error = |source: EngineError| RunError::Strategy {
        name: entry.name.clone(),
        source,
    };
    let backtest = Backtest::new(entry.name.clone(), entry.spec.clone(), config.broker.clone())
        .map_err(|e| strategy_error(e.into()))?;
    let result = backtest.run(feed).map_err(strategy_error)?;
    Ok(StrategyRun::new(&entry.name, result))
}

/// Run every strategy in `config` over `feed`.
///
/// Runs share the immutable feed and nothing else, so they execute on the
/// rayon pool. Results come back in configuration order; the first failing
/// strategy fails the suite.
pub fn run_suite(config: &BacktestConfig, feed: &BarFeed) -> Result<Vec<StrategyRun>, RunError> {
    tracing::info!(
        symbol = feed.symbol(),
        strategies = config.strategies.len(),
        bars = feed.len(),
        "suite started"
    );
    config
        .strategies
        .par_iter()
        .map(|entry| run_entry(entry, config, feed))
        .collect()
}

/// Load the configured feed and run the suite over it.
pub fn run_config(config: &BacktestConfig, opts: &LoadOptions) -> Result<SuiteResult, RunError> {
    config.validate()?;
    let loaded = load_feed(&config.data, opts)?;
    let runs = run_suite(config, &loaded.feed)?;
    let curves = align_curves(runs.iter().map(|r| (r.name.as_str(), &r.result.equity)));
    Ok(SuiteResult {
        schema_version: SCHEMA_VERSION,
        symbol: loaded.feed.symbol().to_string(),
        source: loaded.source,
        has_synthetic: loaded.is_synthetic(),
        dataset_hash: loaded.feed.content_hash(),
        runs,
        curves,
    })
}
