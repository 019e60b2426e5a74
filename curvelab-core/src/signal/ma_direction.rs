//! MA direction: follow the sign of the EMA's one-bar change.

use super::{DecisionRule, Intent, ParamError, Reading};
use crate::smoothing::{Ema, SmoothingError};

#[derive(Debug, Clone)]
pub struct MaDirection {
    ema: Ema,
}

impl MaDirection {
    pub fn new(period: usize) -> Result<Self, ParamError> {
        Ok(Self {
            ema: Ema::new(period).map_err(|_| ParamError::ZeroPeriod { name: "period" })?,
        })
    }
}

impl DecisionRule for MaDirection {
    fn name(&self) -> &'static str {
        "MA Direction"
    }

    fn observe(&mut self, close: f64) -> Result<bool, SmoothingError> {
        self.ema.update(close);
        Ok(self.ema.slope().is_some())
    }

    fn decide(&self, _close: f64, long: bool) -> Intent {
        match self.ema.slope() {
            Some(d) if d > 0.0 && !long => Intent::Enter,
            Some(d) if d < 0.0 && long => Intent::Exit,
            _ => Intent::Hold,
        }
    }

    fn reading(&self) -> Option<Reading> {
        self.ema.slope().map(|value| Reading {
            label: "direction",
            value,
        })
    }
}
