//! Smoothing library: EMA, Hodrick–Prescott filter, LOWESS.
//!
//! All functions are pure over `(history, parameters)`. Batch smoothers
//! return `Ok(None)` while the history is shorter than their minimum, so
//! callers can tell "not yet available" apart from a numerical failure.

pub mod ema;
pub mod hp_filter;
pub mod lowess;

pub use ema::{ema_diff_series, ema_series, Ema};
pub use hp_filter::{hp_filter, HpDecomposition, HP_MIN_OBSERVATIONS};
pub use lowess::{lowess, LOWESS_MIN_OBSERVATIONS, LOWESS_ROBUST_ITERATIONS};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SmoothingError {
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("non-finite input at index {index}: {value}")]
    NonFiniteInput { index: usize, value: f64 },

    #[error("singular system at row {row} (pivot {pivot})")]
    Singular { row: usize, pivot: f64 },

    #[error("non-finite output at index {index}")]
    NonFiniteOutput { index: usize },
}

pub(crate) fn check_finite(values: &[f64]) -> Result<(), SmoothingError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SmoothingError::NonFiniteInput {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_output(values: &[f64]) -> Result<(), SmoothingError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SmoothingError::NonFiniteOutput { index }),
        None => Ok(()),
    }
}

/// Build a synthetic bar series from close prices (test helper).
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = (open.min(close) - 1.0).max(0.0);
            Bar::new(
                base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                1_000.0,
            )
        })
        .collect()
}

/// Approximate float equality (test helper).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
