//! Per-run broker and engine settings.

use crate::signal::ParamError;
use serde::{Deserialize, Serialize};

/// When an accepted order executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillTiming {
    /// Fill at the close of the bar that produced the signal.
    #[default]
    SameBarClose,
    /// Fill at the open of the following bar, before that bar's decision.
    NextBarOpen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub initial_cash: f64,
    /// Fraction of fill notional charged on every fill.
    pub commission_rate: f64,
    pub fill_timing: FillTiming,
    /// Consecutive bars of numerical indicator failure tolerated before the
    /// run is aborted. A streak of two or more bars that is still open when
    /// the feed ends also aborts the run.
    pub max_indicator_failures: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_cash: 10_000.0,
            commission_rate: 0.001,
            fill_timing: FillTiming::SameBarClose,
            max_indicator_failures: 25,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.initial_cash.is_finite() && self.initial_cash > 0.0) {
            return Err(ParamError::NonPositiveCash(self.initial_cash));
        }
        if !(self.commission_rate.is_finite() && self.commission_rate >= 0.0) {
            return Err(ParamError::InvalidCommission(self.commission_rate));
        }
        if self.max_indicator_failures == 0 {
            return Err(ParamError::ZeroFailureLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = RunConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.fill_timing, FillTiming::SameBarClose);
    }

    #[test]
    fn rejects_bad_cash_and_commission() {
        let cfg = RunConfig {
            initial_cash: 0.0,
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ParamError::NonPositiveCash(0.0)));

        let cfg = RunConfig {
            commission_rate: -0.01,
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ParamError::InvalidCommission(-0.01)));

        let cfg = RunConfig {
            max_indicator_failures: 0,
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ParamError::ZeroFailureLimit));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: RunConfig = serde_json::from_str(r#"{"fill_timing":"next_bar_open"}"#).unwrap();
        assert_eq!(cfg.fill_timing, FillTiming::NextBarOpen);
        assert_eq!(cfg.initial_cash, 10_000.0);
    }
}
