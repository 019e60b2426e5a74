//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: EMA[0] = x[0], so a value exists from the first observation.
//! The one-bar difference EMA[t] - EMA[t-1] exists from t = 1.

use super::SmoothingError;

/// Incremental EMA state.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    value: Option<f64>,
    previous: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, SmoothingError> {
        if period == 0 {
            return Err(SmoothingError::InvalidParameter {
                name: "period",
                value: 0.0,
            });
        }
        Ok(Self {
            period,
            alpha: alpha(period),
            value: None,
            previous: None,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Fold in the next observation and return the new average.
    pub fn update(&mut self, x: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
            None => x,
        };
        self.previous = self.value;
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// EMA[t] - EMA[t-1]; `None` until two observations have been seen.
    pub fn slope(&self) -> Option<f64> {
        Some(self.value? - self.previous?)
    }
}

pub fn alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// EMA of a whole series, seeded with the first value.
pub fn ema_series(values: &[f64], period: usize) -> Result<Vec<f64>, SmoothingError> {
    let mut ema = Ema::new(period)?;
    Ok(values.iter().map(|&v| ema.update(v)).collect())
}

/// One-bar EMA difference. Index 0 is NaN (no predecessor).
pub fn ema_diff_series(values: &[f64], period: usize) -> Result<Vec<f64>, SmoothingError> {
    let mut ema = Ema::new(period)?;
    Ok(values
        .iter()
        .map(|&v| {
            ema.update(v);
            ema.slope().unwrap_or(f64::NAN)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn period_zero_is_rejected() {
        assert!(matches!(
            Ema::new(0),
            Err(SmoothingError::InvalidParameter { name: "period", .. })
        ));
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed = 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        let result = ema_series(&[10.0, 11.0, 12.0], 3).unwrap();
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
    }

    #[test]
    fn period_1_tracks_input() {
        let result = ema_series(&[100.0, 200.0, 300.0], 1).unwrap();
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn constant_series_is_fixed_point() {
        let result = ema_series(&[42.0; 50], 12).unwrap();
        assert!(result.iter().all(|&v| (v - 42.0).abs() < DEFAULT_EPSILON));
        let diff = ema_diff_series(&[42.0; 50], 12).unwrap();
        assert!(diff[0].is_nan());
        assert!(diff[1..].iter().all(|&d| d.abs() < DEFAULT_EPSILON));
    }

    #[test]
    fn slope_needs_two_observations() {
        let mut ema = Ema::new(20).unwrap();
        assert_eq!(ema.value(), None);
        ema.update(10.0);
        assert_eq!(ema.slope(), None);
        ema.update(31.0);
        // alpha = 2/21; EMA = 10 + (2/21)*21 = 12
        assert_approx(ema.value().unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(ema.slope().unwrap(), 2.0, DEFAULT_EPSILON);
    }
}
