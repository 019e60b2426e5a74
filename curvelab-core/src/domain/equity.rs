//! Equity curve: one mark-to-market point per processed bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    /// `cash + position * close` at the end of the bar.
    pub value: f64,
    pub cash: f64,
    pub position: i64,
}

/// Ordered sequence of equity points with strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn from_points(points: Vec<EquityPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_value(&self) -> Option<f64> {
        self.points.first().map(|p| p.value)
    }

    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Simple per-bar returns `v[t] / v[t-1] - 1` for `t >= 1`.
    ///
    /// The first point has no predecessor and is omitted, so the result has
    /// `len() - 1` entries keyed by the later date.
    pub fn returns(&self) -> Vec<(NaiveDate, f64)> {
        self.points
            .windows(2)
            .map(|w| {
                let r = if w[0].value == 0.0 {
                    0.0
                } else {
                    w[1].value / w[0].value - 1.0
                };
                (w[1].date, r)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, value: f64) -> EquityPoint {
        EquityPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            value,
            cash: value,
            position: 0,
        }
    }

    #[test]
    fn returns_skip_first_point() {
        let curve =
            EquityCurve::from_points(vec![point(1, 100.0), point(2, 110.0), point(3, 99.0)]);
        let r = curve.returns();
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].0, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!((r[0].1 - 0.10).abs() < 1e-12);
        assert!((r[1].1 + 0.10).abs() < 1e-12);
    }

    #[test]
    fn empty_curve() {
        let curve = EquityCurve::default();
        assert!(curve.is_empty());
        assert!(curve.returns().is_empty());
        assert_eq!(curve.final_value(), None);
    }
}
