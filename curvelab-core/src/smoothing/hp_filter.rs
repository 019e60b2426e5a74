//! Hodrick–Prescott filter.
//!
//! The trend τ minimises `Σ(y - τ)² + λ Σ(Δ²τ)²`, i.e. it solves
//! `(I + λ DᵀD) τ = y` where D is the (n-2)×n second-difference operator.
//! The system matrix is symmetric positive definite and pentadiagonal, so it
//! is factored as LDLᵀ with two sub-diagonals and solved in O(n).

use super::{check_finite, check_output, SmoothingError};

pub const HP_MIN_OBSERVATIONS: usize = 4;

/// Trend and cycle for every observation; `cycle[i] = y[i] - trend[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HpDecomposition {
    pub trend: Vec<f64>,
    pub cycle: Vec<f64>,
}

impl HpDecomposition {
    /// `(trend, cycle)` at the most recent observation.
    pub fn latest(&self) -> Option<(f64, f64)> {
        Some((*self.trend.last()?, *self.cycle.last()?))
    }
}

/// Decompose `values` with smoothing parameter `lambda`.
///
/// Returns `Ok(None)` with fewer than [`HP_MIN_OBSERVATIONS`] points.
pub fn hp_filter(
    values: &[f64],
    lambda: f64,
) -> Result<Option<HpDecomposition>, SmoothingError> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(SmoothingError::InvalidParameter {
            name: "lambda",
            value: lambda,
        });
    }
    let n = values.len();
    if n < HP_MIN_OBSERVATIONS {
        return Ok(None);
    }
    check_finite(values)?;

    let trend = solve_pentadiagonal(values, lambda)?;
    check_output(&trend)?;
    let cycle = values.iter().zip(&trend).map(|(y, t)| y - t).collect();
    Ok(Some(HpDecomposition { trend, cycle }))
}

fn solve_pentadiagonal(y: &[f64], lambda: f64) -> Result<Vec<f64>, SmoothingError> {
    let n = y.len();

    // Bands of A = I + λDᵀD: diag[i] = A[i][i], sub1[i] = A[i][i-1], sub2[i] = A[i][i-2].
    let mut diag = vec![1.0; n];
    let mut sub1 = vec![0.0; n];
    let mut sub2 = vec![0.0; n];
    const D: [f64; 3] = [1.0, -2.0, 1.0];
    for j in 0..n - 2 {
        for a in 0..3 {
            for b in 0..=a {
                let v = lambda * D[a] * D[b];
                match a - b {
                    0 => diag[j + a] += v,
                    1 => sub1[j + a] += v,
                    _ => sub2[j + a] += v,
                }
            }
        }
    }

    // LDLᵀ: L unit lower triangular with l1[i] = L[i][i-1], l2[i] = L[i][i-2].
    let mut d = vec![0.0; n];
    let mut l1 = vec![0.0; n];
    let mut l2 = vec![0.0; n];
    for i in 0..n {
        if i >= 2 {
            l2[i] = sub2[i] / d[i - 2];
        }
        if i >= 1 {
            let carry = if i >= 2 { l2[i] * l1[i - 1] * d[i - 2] } else { 0.0 };
            l1[i] = (sub1[i] - carry) / d[i - 1];
        }
        let mut pivot = diag[i];
        if i >= 1 {
            pivot -= l1[i] * l1[i] * d[i - 1];
        }
        if i >= 2 {
            pivot -= l2[i] * l2[i] * d[i - 2];
        }
        if !(pivot.is_finite() && pivot > 0.0) {
            return Err(SmoothingError::Singular { row: i, pivot });
        }
        d[i] = pivot;
    }

    // L z = y
    let mut x = vec![0.0; n];
    for i in 0..n {
        let mut z = y[i];
        if i >= 1 {
            z -= l1[i] * x[i - 1];
        }
        if i >= 2 {
            z -= l2[i] * x[i - 2];
        }
        x[i] = z;
    }
    // D w = z
    for i in 0..n {
        x[i] /= d[i];
    }
    // Lᵀ τ = w
    for i in (0..n).rev() {
        if i + 1 < n {
            x[i] -= l1[i + 1] * x[i + 1];
        }
        if i + 2 < n {
            x[i] -= l2[i + 2] * x[i + 2];
        }
    }
    Ok(x)
}
