//! LOWESS: trade price crossings of a LOWESS curve fitted to the full
//! close history.
//!
//! Each bar refits the whole history; the previous smoothed value used for
//! the crossing test comes from that same refit, not from yesterday's fit.

use super::{DecisionRule, Intent, Reading};
use crate::smoothing::{lowess, SmoothingError, LOWESS_ROBUST_ITERATIONS};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Crossing {
    prev_close: f64,
    prev_smooth: f64,
    smooth: f64,
}

#[derive(Debug, Clone)]
pub struct LowessSignal {
    fraction: f64,
    closes: Vec<f64>,
    latest: Option<Crossing>,
}

impl LowessSignal {
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction,
            closes: Vec::new(),
            latest: None,
        }
    }

    pub fn smoothed(&self) -> Option<f64> {
        self.latest.map(|c| c.smooth)
    }
}

impl DecisionRule for LowessSignal {
    fn name(&self) -> &'static str {
        "Lowess"
    }

    fn observe(&mut self, close: f64) -> Result<bool, SmoothingError> {
        self.closes.push(close);
        self.latest = None;
        let Some(fit) = lowess(&self.closes, self.fraction, LOWESS_ROBUST_ITERATIONS)? else {
            return Ok(false);
        };
        let n = fit.len();
        self.latest = Some(Crossing {
            prev_close: self.closes[n - 2],
            prev_smooth: fit[n - 2],
            smooth: fit[n - 1],
        });
        Ok(true)
    }

    fn decide(&self, close: f64, long: bool) -> Intent {
        let Some(c) = self.latest else {
            return Intent::Hold;
        };
        if !long && c.prev_close <= c.prev_smooth && close > c.smooth {
            Intent::Enter
        } else if long && c.prev_close >= c.prev_smooth && close < c.smooth {
            Intent::Exit
        } else {
            Intent::Hold
        }
    }

    fn reading(&self) -> Option<Reading> {
        self.smoothed().map(|value| Reading {
            label: "lowess",
            value,
        })
    }
}
