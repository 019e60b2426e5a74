//! CurveLab Runner: suite orchestration on top of `curvelab-core`.
//!
//! This crate provides:
//! - TOML suite configuration with a built-in reference suite
//! - Feed loading from CSV, Yahoo, or a seeded synthetic walk (with fallback)
//! - Parallel execution of every configured strategy over one shared feed
//! - Date-aligned join of the resulting equity curves
//! - Performance summaries and JSON/CSV artifacts

pub mod align;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use align::{align_curves, AlignedCurves};
pub use config::{BacktestConfig, ConfigError, DataConfig, OutputConfig, SourceKind, StrategyEntry};
pub use data_loader::{load_feed, LoadError, LoadOptions, LoadedFeed, SyntheticProvider};
pub use export::save_artifacts;
pub use metrics::PerformanceSummary;
pub use runner::{run_config, run_suite, RunError, StrategyRun, SuiteResult};
