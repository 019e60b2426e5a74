//! LOWESS: locally weighted scatterplot smoothing on an evenly spaced axis.
//!
//! For each point a weighted linear regression is fitted over its `k`
//! nearest neighbours (`k = floor(fraction * n)`, clamped to `[2, n]`) with
//! tricube distance weights. Robustifying passes then downweight points with
//! large residuals using bisquare weights scaled by six median absolute
//! residuals. Iteration stops early once the median residual is negligible
//! next to the mean magnitude of the data.

use super::{check_finite, check_output, SmoothingError};

pub const LOWESS_MIN_OBSERVATIONS: usize = 2;
pub const LOWESS_ROBUST_ITERATIONS: usize = 3;

/// Distances at or below this fraction of the radius get full weight.
const NEAR: f64 = 0.001;
/// Distances at or above this fraction of the radius get zero weight.
const FAR: f64 = 0.999;

/// Smooth `values` against their index `0..n`.
///
/// Returns `Ok(None)` with fewer than [`LOWESS_MIN_OBSERVATIONS`] points.
pub fn lowess(
    values: &[f64],
    fraction: f64,
    iterations: usize,
) -> Result<Option<Vec<f64>>, SmoothingError> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(SmoothingError::InvalidParameter {
            name: "fraction",
            value: fraction,
        });
    }
    let n = values.len();
    if n < LOWESS_MIN_OBSERVATIONS {
        return Ok(None);
    }
    check_finite(values)?;

    let k = ((fraction * n as f64 + 1e-10) as usize).clamp(2, n);
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let magnitude = values.iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    let mut robustness = vec![1.0; n];
    let mut fitted = fit_pass(&x, values, k, &robustness);

    for _ in 0..iterations {
        let residuals: Vec<f64> = values.iter().zip(&fitted).map(|(y, f)| y - f).collect();
        let mad = median_abs(&residuals);
        if mad <= 1e-10 * magnitude {
            break;
        }
        let scale = 6.0 * mad;
        for (w, r) in robustness.iter_mut().zip(&residuals) {
            *w = bisquare(r / scale);
        }
        fitted = fit_pass(&x, values, k, &robustness);
    }

    check_output(&fitted)?;
    Ok(Some(fitted))
}

fn fit_pass(x: &[f64], y: &[f64], k: usize, robustness: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut out = vec![0.0; n];
    let mut weights = vec![0.0; n];
    let (mut left, mut right) = (0usize, k);

    for i in 0..n {
        // Slide the k-point window while it is closer to the right.
        while right < n && x[i] - x[left] > x[right] - x[i] {
            left += 1;
            right += 1;
        }

        let radius = (x[i] - x[left]).max(x[right - 1] - x[i]);
        let mut total = 0.0;
        for j in left..right {
            let dist = if radius > 0.0 { (x[j] - x[i]).abs() / radius } else { 0.0 };
            let w = if dist <= NEAR {
                1.0
            } else if dist >= FAR {
                0.0
            } else {
                tricube(dist)
            };
            weights[j] = w * robustness[j];
            total += weights[j];
        }

        if total <= 0.0 {
            out[i] = y[i];
            continue;
        }

        let window = left..right;
        let mean_x: f64 = window.clone().map(|j| weights[j] * x[j]).sum::<f64>() / total;
        let spread: f64 = window
            .clone()
            .map(|j| weights[j] * (x[j] - mean_x).powi(2))
            .sum::<f64>()
            / total;

        // The hat weights sum to one, so fitting deviations from y[i]
        // reproduces locally constant data exactly.
        let shift: f64 = window
            .map(|j| {
                let w = weights[j] / total;
                let lever = if spread > 0.0 {
                    1.0 + (x[i] - mean_x) * (x[j] - mean_x) / spread
                } else {
                    1.0
                };
                w * lever * (y[j] - y[i])
            })
            .sum();
        out[i] = y[i] + shift;
    }
    out
}

fn tricube(u: f64) -> f64 {
    let t = 1.0 - u.abs().powi(3);
    t * t * t
}

fn bisquare(u: f64) -> f64 {
    let u = u.abs();
    if u <= NEAR {
        1.0
    } else if u >= FAR {
        0.0
    } else {
        let t = 1.0 - u * u;
        t * t
    }
}

fn median_abs(values: &[f64]) -> f64 {
    let mut abs: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    abs.sort_by(|a, b| a.total_cmp(b));
    let mid = abs.len() / 2;
    if abs.len() % 2 == 0 {
        (abs[mid - 1] + abs[mid]) / 2.0
    } else {
        abs[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::assert_approx;

    #[test]
    fn single_point_is_unavailable() {
        assert_eq!(lowess(&[1.0], 0.1, 3).unwrap(), None);
    }

    #[test]
    fn two_points_fall_back_to_inputs() {
        let out = lowess(&[1.0, 5.0], 0.1, 3).unwrap().unwrap();
        assert_approx(out[0], 1.0, 1e-12);
        assert_approx(out[1], 5.0, 1e-12);
    }

    #[test]
    fn straight_line_is_reproduced() {
        let y: Vec<f64> = (0..60).map(|i| 2.0 + 0.25 * i as f64).collect();
        let out = lowess(&y, 0.3, 3).unwrap().unwrap();
        for (s, v) in out.iter().zip(&y) {
            assert_approx(*s, *v, 1e-9);
        }
    }

    #[test]
    fn constant_series_is_reproduced() {
        let out = lowess(&[7.5; 30], 0.1, 3).unwrap().unwrap();
        assert!(out.iter().all(|v| (v - 7.5).abs() < 1e-12));
    }

    #[test]
    fn robust_pass_resists_single_outlier() {
        let mut y: Vec<f64> = (0..41).map(|i| i as f64).collect();
        y[20] = 400.0;
        // Every window sees the outlier, so most residuals are non-zero.
        let robust = lowess(&y, 1.0, 3).unwrap().unwrap();
        let plain = lowess(&y, 1.0, 0).unwrap().unwrap();
        assert!((robust[20] - 20.0).abs() < (plain[20] - 20.0).abs());
        assert!((robust[20] - 20.0).abs() < 1.0);
    }

    #[test]
    fn rejects_fraction_outside_unit_interval() {
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                lowess(&[1.0, 2.0, 3.0], bad, 3),
                Err(SmoothingError::InvalidParameter { name: "fraction", .. })
            ));
        }
    }

    #[test]
    fn median_of_even_length() {
        assert_eq!(median_abs(&[-4.0, 1.0, 2.0, -3.0]), 2.5);
    }
}
