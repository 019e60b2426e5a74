//! Strategy parameter sets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("initial_cash must be > 0 (got {0})")]
    NonPositiveCash(f64),

    #[error("commission_rate must be a finite value >= 0 (got {0})")]
    InvalidCommission(f64),

    #[error("max_indicator_failures must be >= 1")]
    ZeroFailureLimit,

    #[error("stake must be > 0 (got {0})")]
    NonPositiveStake(i64),

    #[error("{name} must be a positive integer")]
    ZeroPeriod { name: &'static str },

    #[error("lambda must be a finite value > 0 (got {0})")]
    InvalidLambda(f64),

    #[error("fraction must be in (0, 1] (got {0})")]
    InvalidFraction(f64),
}

/// One strategy variant with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySpec {
    EmaCrossover {
        fast_period: usize,
        slow_period: usize,
        stake: i64,
    },
    MaDirection {
        period: usize,
        stake: i64,
    },
    HpFilter {
        lambda: f64,
        stake: i64,
    },
    Lowess {
        fraction: f64,
        stake: i64,
    },
}

impl StrategySpec {
    pub fn stake(&self) -> i64 {
        match self {
            StrategySpec::EmaCrossover { stake, .. }
            | StrategySpec::MaDirection { stake, .. }
            | StrategySpec::HpFilter { stake, .. }
            | StrategySpec::Lowess { stake, .. } => *stake,
        }
    }

    /// Machine name of the variant, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            StrategySpec::EmaCrossover { .. } => "ema_crossover",
            StrategySpec::MaDirection { .. } => "ma_direction",
            StrategySpec::HpFilter { .. } => "hp_filter",
            StrategySpec::Lowess { .. } => "lowess",
        }
    }

    /// Display name used when a configuration does not provide one.
    pub fn display_name(&self) -> &'static str {
        match self {
            StrategySpec::EmaCrossover { .. } => "EMA Crossover",
            StrategySpec::MaDirection { .. } => "MA Direction",
            StrategySpec::HpFilter { .. } => "HP Filter",
            StrategySpec::Lowess { .. } => "Lowess",
        }
    }

    /// Check parameter ranges. `fast_period < slow_period` is conventional
    /// but deliberately not required.
    pub fn validate(&self) -> Result<(), ParamError> {
        let stake = self.stake();
        if stake <= 0 {
            return Err(ParamError::NonPositiveStake(stake));
        }
        match *self {
            StrategySpec::EmaCrossover {
                fast_period,
                slow_period,
                ..
            } => {
                if fast_period == 0 {
                    return Err(ParamError::ZeroPeriod { name: "fast_period" });
                }
                if slow_period == 0 {
                    return Err(ParamError::ZeroPeriod { name: "slow_period" });
                }
            }
            StrategySpec::MaDirection { period, .. } => {
                if period == 0 {
                    return Err(ParamError::ZeroPeriod { name: "period" });
                }
            }
            StrategySpec::HpFilter { lambda, .. } => {
                if !(lambda.is_finite() && lambda > 0.0) {
                    return Err(ParamError::InvalidLambda(lambda));
                }
            }
            StrategySpec::Lowess { fraction, .. } => {
                if !(fraction > 0.0 && fraction <= 1.0) {
                    return Err(ParamError::InvalidFraction(fraction));
                }
            }
        }
        Ok(())
    }

    /// Canonical JSON of the parameters, used for run identity hashing.
    pub fn params_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stake_and_kind() {
        let spec = StrategySpec::HpFilter {
            lambda: 1600.0,
            stake: 3,
        };
        assert_eq!(spec.stake(), 3);
        assert_eq!(spec.kind(), "hp_filter");
        assert_eq!(spec.display_name(), "HP Filter");
    }

    #[test]
    fn fast_greater_than_slow_is_allowed() {
        let spec = StrategySpec::EmaCrossover {
            fast_period: 30,
            slow_period: 10,
            stake: 1,
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let cases = [
            (
                StrategySpec::MaDirection { period: 0, stake: 1 },
                ParamError::ZeroPeriod { name: "period" },
            ),
            (
                StrategySpec::MaDirection { period: 5, stake: 0 },
                ParamError::NonPositiveStake(0),
            ),
            (
                StrategySpec::HpFilter { lambda: 0.0, stake: 1 },
                ParamError::InvalidLambda(0.0),
            ),
            (
                StrategySpec::Lowess { fraction: 1.5, stake: 1 },
                ParamError::InvalidFraction(1.5),
            ),
        ];
        for (spec, expected) in cases {
            assert_eq!(spec.validate().unwrap_err(), expected);
        }
    }

    #[test]
    fn serde_uses_kind_tag() {
        let spec: StrategySpec =
            serde_json::from_str(r#"{"kind":"lowess","fraction":0.1,"stake":1}"#).unwrap();
        assert_eq!(
            spec,
            StrategySpec::Lowess {
                fraction: 0.1,
                stake: 1
            }
        );
    }
}
