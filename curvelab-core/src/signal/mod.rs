//! Signal evaluation: per-bar indicator update and entry/exit decision.
//!
//! A [`SignalEvaluator`] is a closed set of decision rules. Each variant owns
//! only its own indicator state; the engine owns position and order state and
//! passes the relevant facts in as an [`Exposure`].

pub mod ema_crossover;
pub mod hp_filter;
pub mod lowess;
pub mod ma_direction;
pub mod spec;

pub use ema_crossover::{detect_cross, Cross, EmaCrossover};
pub use hp_filter::HpFilterSignal;
pub use lowess::LowessSignal;
pub use ma_direction::MaDirection;
pub use spec::{ParamError, StrategySpec};

use crate::domain::Bar;
use crate::smoothing::SmoothingError;
use serde::{Deserialize, Serialize};

/// What a strategy wants to do on this bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Open a long position (only emitted while flat).
    Enter,
    /// Close the whole position (only emitted while long).
    Exit,
    Hold,
}

/// Position facts the evaluator needs from the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exposure {
    pub long: bool,
    pub order_pending: bool,
}

/// The indicator value behind a decision, for logs and audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub label: &'static str,
    pub value: f64,
}

/// A single strategy's decision rule.
pub trait DecisionRule {
    fn name(&self) -> &'static str;

    /// Fold the bar's close into indicator state.
    ///
    /// Returns `Ok(false)` while the indicator is not yet available.
    fn observe(&mut self, close: f64) -> Result<bool, SmoothingError>;

    /// Decide from the current indicator state. Only called once `observe`
    /// has reported the indicator available for this bar.
    fn decide(&self, close: f64, long: bool) -> Intent;

    fn reading(&self) -> Option<Reading>;
}

/// Closed set of strategy variants.
#[derive(Debug, Clone)]
pub enum SignalEvaluator {
    EmaCrossover(EmaCrossover),
    MaDirection(MaDirection),
    HpFilter(HpFilterSignal),
    Lowess(LowessSignal),
}

impl SignalEvaluator {
    pub fn from_spec(spec: &StrategySpec) -> Result<Self, ParamError> {
        spec.validate()?;
        Ok(match *spec {
            StrategySpec::EmaCrossover {
                fast_period,
                slow_period,
                ..
            } => SignalEvaluator::EmaCrossover(EmaCrossover::new(fast_period, slow_period)?),
            StrategySpec::MaDirection { period, .. } => {
                SignalEvaluator::MaDirection(MaDirection::new(period)?)
            }
            StrategySpec::HpFilter { lambda, .. } => {
                SignalEvaluator::HpFilter(HpFilterSignal::new(lambda))
            }
            StrategySpec::Lowess { fraction, .. } => {
                SignalEvaluator::Lowess(LowessSignal::new(fraction))
            }
        })
    }

    fn rule(&self) -> &dyn DecisionRule {
        match self {
            SignalEvaluator::EmaCrossover(r) => r,
            SignalEvaluator::MaDirection(r) => r,
            SignalEvaluator::HpFilter(r) => r,
            SignalEvaluator::Lowess(r) => r,
        }
    }

    fn rule_mut(&mut self) -> &mut dyn DecisionRule {
        match self {
            SignalEvaluator::EmaCrossover(r) => r,
            SignalEvaluator::MaDirection(r) => r,
            SignalEvaluator::HpFilter(r) => r,
            SignalEvaluator::Lowess(r) => r,
        }
    }

    pub fn name(&self) -> &'static str {
        self.rule().name()
    }

    pub fn reading(&self) -> Option<Reading> {
        self.rule().reading()
    }

    /// Update indicator state with `bar` and return the intent for this bar.
    ///
    /// The indicator is updated on every bar. A pending order suppresses any
    /// intent before the rule is consulted, and an unavailable indicator
    /// yields `Hold`. Numerical failures are returned so the caller can
    /// decide how many to tolerate.
    pub fn evaluate(&mut self, bar: &Bar, exposure: Exposure) -> Result<Intent, SmoothingError> {
        let rule = self.rule_mut();
        let ready = rule.observe(bar.close)?;
        if exposure.order_pending || !ready {
            return Ok(Intent::Hold);
        }
        Ok(rule.decide(bar.close, exposure.long))
    }
}
