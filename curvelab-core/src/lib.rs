//! CurveLab Core: bar feed, smoothing filters, signal evaluators, broker
//! state machine and the single-run backtest loop.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (bars, orders, fills, positions, trades, equity points)
//! - Validated, restartable bar feeds and their providers (CSV, Yahoo)
//! - Smoothing library (EMA, Hodrick–Prescott, LOWESS)
//! - Closed set of signal evaluators over those smoothers
//! - Order and position state machine with flat commission
//! - Bar-by-bar orchestrator producing an equity curve and audit trail

pub mod data;
pub mod domain;
pub mod engine;
pub mod signal;
pub mod smoothing;

pub use data::{BarFeed, FeedError, FeedRequest};
pub use domain::{Bar, EquityCurve, EquityPoint};
pub use engine::{run_backtest, Backtest, EngineError, FillTiming, RunConfig, RunResult};
pub use signal::{Intent, ParamError, SignalEvaluator, StrategySpec};
