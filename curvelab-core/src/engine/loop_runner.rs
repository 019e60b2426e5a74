//! Backtest orchestrator: drives one strategy over one bar feed.

use super::accounting::EquityTracker;
use super::audit::{AuditKind, AuditLog};
use super::broker::Broker;
use super::config::{FillTiming, RunConfig};
use super::state::{EngineError, RunResult};
use crate::data::{BarFeed, DataProvider, FeedRequest};
use crate::domain::{OrderSide, RunId};
use crate::signal::{Exposure, Intent, ParamError, SignalEvaluator, StrategySpec};
use chrono::NaiveDate;

/// Start of the current run of consecutive indicator failures.
#[derive(Debug, Clone)]
struct FailureStreak {
    bar_index: usize,
    date: NaiveDate,
    count: usize,
    reason: String,
}

impl FailureStreak {
    fn into_error(self, strategy: &str) -> EngineError {
        EngineError::IndicatorFailure {
            strategy: strategy.to_string(),
            bar_index: self.bar_index,
            date: self.date,
            consecutive: self.count,
            reason: self.reason,
        }
    }
}

/// A validated (strategy, parameters, run config) triple, ready to run.
#[derive(Debug, Clone)]
pub struct Backtest {
    name: String,
    spec: StrategySpec,
    config: RunConfig,
}

impl Backtest {
    pub fn new(
        name: impl Into<String>,
        spec: StrategySpec,
        config: RunConfig,
    ) -> Result<Self, ParamError> {
        spec.validate()?;
        config.validate()?;
        Ok(Self {
            name: name.into(),
            spec,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &StrategySpec {
        &self.spec
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Load the feed from `provider` and run over it.
    pub fn run_from(
        &self,
        provider: &dyn DataProvider,
        request: &FeedRequest,
    ) -> Result<RunResult, EngineError> {
        let feed = provider.fetch(request)?;
        self.run(&feed)
    }

    /// Run over every bar of `feed`, from the first.
    pub fn run(&self, feed: &BarFeed) -> Result<RunResult, EngineError> {
        let config = &self.config;
        let strategy = self.name.as_str();
        let stake = self.spec.stake();

        let mut evaluator = SignalEvaluator::from_spec(&self.spec)?;
        let mut broker = Broker::new(config.initial_cash, config.commission_rate);
        let mut tracker = EquityTracker::with_capacity(feed.len());
        let mut audit = AuditLog::new(strategy);
        let mut intents = Vec::with_capacity(feed.len());
        let mut streak: Option<FailureStreak> = None;

        tracing::info!(
            strategy,
            symbol = feed.symbol(),
            bars = feed.len(),
            start = %feed.first_date(),
            end = %feed.last_date(),
            "backtest started"
        );

        for (t, bar) in feed.iter().enumerate() {
            // ─── Start-of-bar ───
            if config.fill_timing == FillTiming::NextBarOpen {
                broker.execute_pending(bar.open, t, bar.date, &mut audit)?;
            }

            // ─── Signal ───
            let exposure = Exposure {
                long: broker.position().is_long(),
                order_pending: broker.has_pending(),
            };
            let intent = match evaluator.evaluate(bar, exposure) {
                Ok(intent) => {
                    streak = None;
                    intent
                }
                Err(err) => {
                    let reason = err.to_string();
                    audit.record(
                        t,
                        bar.date,
                        AuditKind::IndicatorUnavailable {
                            reason: reason.clone(),
                        },
                    );
                    let s = streak.get_or_insert(FailureStreak {
                        bar_index: t,
                        date: bar.date,
                        count: 0,
                        reason: String::new(),
                    });
                    s.count += 1;
                    s.reason = reason;
                    if s.count >= config.max_indicator_failures {
                        return Err(s.clone().into_error(strategy));
                    }
                    Intent::Hold
                }
            };
            intents.push(intent);

            // ─── Submit ───
            let order = match intent {
                Intent::Enter => Some((OrderSide::Buy, stake)),
                Intent::Exit => Some((OrderSide::Sell, broker.position().size)),
                Intent::Hold => None,
            };
            if let Some((side, size)) = order {
                let reading = evaluator.reading();
                broker.submit(side, size, t, bar.date, bar.close, reading, &mut audit)?;
            }

            // ─── End-of-bar ───
            if config.fill_timing == FillTiming::SameBarClose {
                broker.execute_pending(bar.close, t, bar.date, &mut audit)?;
            }

            // ─── Post-bar ───
            tracker.record(bar.date, broker.portfolio(), bar.close);
        }

        // A failure streak still open at the last bar never recovered. A
        // lone failure on the final bar is held like any other.
        if let Some(s) = streak.filter(|s| s.count > 1) {
            return Err(s.into_error(strategy));
        }

        if broker.has_pending() {
            let last = feed.len() - 1;
            let reason = "feed exhausted before fill";
            broker.cancel_pending(last, feed.last_date(), reason, &mut audit)?;
        }

        let equity = tracker.finish();
        let final_value = equity.final_value().unwrap_or(config.initial_cash);
        let ledger = broker.into_ledger();
        let dataset_hash = feed.content_hash();
        let params = serde_json::json!({ "spec": &self.spec, "config": config }).to_string();
        let run_id = RunId::new(strategy, params, dataset_hash.clone()).hash();

        tracing::info!(
            strategy,
            starting_cash = config.initial_cash,
            final_cash = ledger.portfolio.cash,
            final_value,
            net_change = final_value - config.initial_cash,
            trades = ledger.trades.len(),
            "backtest finished"
        );

        Ok(RunResult {
            strategy: self.name.clone(),
            symbol: feed.symbol().to_string(),
            spec: self.spec.clone(),
            config: config.clone(),
            dataset_hash,
            run_id,
            bar_count: feed.len(),
            starting_cash: config.initial_cash,
            final_cash: ledger.portfolio.cash,
            final_value,
            final_position: ledger.portfolio.position,
            equity,
            intents,
            orders: ledger.orders,
            fills: ledger.fills,
            trades: ledger.trades,
            audit: audit.into_events(),
        })
    }
}

/// Validate and run in one step.
pub fn run_backtest(
    name: &str,
    spec: &StrategySpec,
    config: &RunConfig,
    feed: &BarFeed,
) -> Result<RunResult, EngineError> {
    Backtest::new(name, spec.clone(), config.clone())?.run(feed)
}
