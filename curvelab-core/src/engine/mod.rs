//! Backtesting engine: the single-run bar loop and its supporting state.
//!
//! Per bar, in order:
//!
//! 1. Start-of-bar: with `NextBarOpen`, fill the order accepted on the previous bar
//! 2. Signal: update indicator state, ask the evaluator for an intent
//! 3. Submit: turn the intent into a market order (at most one in flight)
//! 4. End-of-bar: with `SameBarClose`, fill the order at this bar's close
//! 5. Post-bar: mark to market and record the equity point

pub mod accounting;
pub mod audit;
pub mod broker;
pub mod config;
pub mod loop_runner;
pub mod state;

pub use accounting::EquityTracker;
pub use audit::{AuditEvent, AuditKind, AuditLog};
pub use broker::Broker;
pub use config::{FillTiming, RunConfig};
pub use loop_runner::{run_backtest, Backtest};
pub use state::{EngineError, RunResult};
