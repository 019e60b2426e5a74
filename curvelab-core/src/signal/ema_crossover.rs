//! EMA crossover: enter when the fast EMA crosses above the slow EMA,
//! exit when it crosses below.
//!
//! A cross is a sign change of `fast - slow` between consecutive bars:
//! up when the previous spread is `<= 0` and the current one `> 0`, down when
//! the previous spread is `>= 0` and the current one `< 0`.

use super::{DecisionRule, Intent, ParamError, Reading};
use crate::smoothing::{Ema, SmoothingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Up,
    Down,
}

pub fn detect_cross(prev_spread: f64, spread: f64) -> Option<Cross> {
    if prev_spread <= 0.0 && spread > 0.0 {
        Some(Cross::Up)
    } else if prev_spread >= 0.0 && spread < 0.0 {
        Some(Cross::Down)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct EmaCrossover {
    fast: Ema,
    slow: Ema,
    prev_spread: Option<f64>,
    spread: Option<f64>,
}

impl EmaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self, ParamError> {
        Ok(Self {
            fast: Ema::new(fast_period).map_err(|_| ParamError::ZeroPeriod {
                name: "fast_period",
            })?,
            slow: Ema::new(slow_period).map_err(|_| ParamError::ZeroPeriod {
                name: "slow_period",
            })?,
            prev_spread: None,
            spread: None,
        })
    }
}

impl DecisionRule for EmaCrossover {
    fn name(&self) -> &'static str {
        "EMA Crossover"
    }

    fn observe(&mut self, close: f64) -> Result<bool, SmoothingError> {
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        self.prev_spread = self.spread;
        self.spread = Some(fast - slow);
        Ok(self.prev_spread.is_some())
    }

    fn decide(&self, _close: f64, long: bool) -> Intent {
        let (Some(prev), Some(cur)) = (self.prev_spread, self.spread) else {
            return Intent::Hold;
        };
        match detect_cross(prev, cur) {
            Some(Cross::Up) if !long => Intent::Enter,
            Some(Cross::Down) if long => Intent::Exit,
            _ => Intent::Hold,
        }
    }

    fn reading(&self) -> Option<Reading> {
        self.spread.map(|value| Reading {
            label: "fast_minus_slow",
            value,
        })
    }
}
