//! HP filter: long while the cyclical component of price is positive.
//!
//! The full close history is re-filtered on every bar, so each decision uses
//! the two-sided filter exactly as it would look with data through that bar.

use super::{DecisionRule, Intent, Reading};
use crate::smoothing::{hp_filter, SmoothingError};

#[derive(Debug, Clone)]
pub struct HpFilterSignal {
    lambda: f64,
    closes: Vec<f64>,
    /// Cycle component at the latest bar.
    cycle: Option<f64>,
}

impl HpFilterSignal {
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            closes: Vec::new(),
            cycle: None,
        }
    }

    pub fn cycle(&self) -> Option<f64> {
        self.cycle
    }
}

impl DecisionRule for HpFilterSignal {
    fn name(&self) -> &'static str {
        "HP Filter"
    }

    fn observe(&mut self, close: f64) -> Result<bool, SmoothingError> {
        self.closes.push(close);
        self.cycle = None;
        let decomposition = hp_filter(&self.closes, self.lambda)?;
        self.cycle = decomposition.and_then(|d| d.latest()).map(|(_, cycle)| cycle);
        Ok(self.cycle.is_some())
    }

    fn decide(&self, _close: f64, long: bool) -> Intent {
        match self.cycle() {
            Some(c) if c > 0.0 && !long => Intent::Enter,
            Some(c) if c < 0.0 && long => Intent::Exit,
            _ => Intent::Hold,
        }
    }

    fn reading(&self) -> Option<Reading> {
        self.cycle().map(|value| Reading {
            label: "cycle",
            value,
        })
    }
}
