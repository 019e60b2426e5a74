//! Run result and engine error types.

use super::audit::AuditEvent;
use super::config::RunConfig;
use crate::data::FeedError;
use crate::domain::{DatasetHash, EquityCurve, Fill, Order, Position, TradeRecord};
use crate::signal::{Intent, ParamError, StrategySpec};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("order state error: {0}")]
    Order(#[from] crate::domain::OrderError),

    #[error(
        "{strategy}: indicator failed on {consecutive} bars from bar {bar_index} ({date}): {reason}"
    )]
    IndicatorFailure {
        strategy: String,
        bar_index: usize,
        date: NaiveDate,
        consecutive: usize,
        reason: String,
    },
}

/// Everything one strategy run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub strategy: String,
    pub symbol: String,
    pub spec: StrategySpec,
    pub config: RunConfig,
    pub dataset_hash: DatasetHash,
    /// BLAKE3 of strategy name, parameters, run config and dataset.
    pub run_id: String,
    pub bar_count: usize,
    pub starting_cash: f64,
    pub final_cash: f64,
    pub final_value: f64,
    pub final_position: Position,
    pub equity: EquityCurve,
    /// One decision per bar.
    pub intents: Vec<Intent>,
    /// Orders in the order they reached a terminal status.
    pub orders: Vec<Order>,
    pub fills: Vec<Fill>,
    pub trades: Vec<TradeRecord>,
    pub audit: Vec<AuditEvent>,
}

impl RunResult {
    pub fn net_change(&self) -> f64 {
        self.final_value - self.starting_cash
    }

    pub fn total_commission(&self) -> f64 {
        self.fills.iter().map(|f| f.commission).sum()
    }
}
