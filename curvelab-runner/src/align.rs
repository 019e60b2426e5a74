//! Date-aligned join of equity curves for cross-strategy comparison.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use curvelab_core::EquityCurve;
use serde::{Deserialize, Serialize};

/// One row per date in the union of all curves' dates, one column per curve.
///
/// A column is forward-filled across dates its curve does not cover; dates
/// before the curve's first point stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedCurves {
    pub dates: Vec<NaiveDate>,
    pub names: Vec<String>,
    /// `columns[c][row]`
    pub columns: Vec<Vec<Option<f64>>>,
}

impl AlignedCurves {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// Row `i` as `(date, values)`.
    pub fn row(&self, i: usize) -> Option<(NaiveDate, Vec<Option<f64>>)> {
        let date = *self.dates.get(i)?;
        Some((date, self.columns.iter().map(|c| c[i]).collect()))
    }
}

pub fn align_curves<'a, I>(curves: I) -> AlignedCurves
where
    I: IntoIterator<Item = (&'a str, &'a EquityCurve)>,
{
    let curves: Vec<(&str, &EquityCurve)> = curves.into_iter().collect();
    let dates: Vec<NaiveDate> = curves
        .iter()
        .flat_map(|(_, c)| c.points().iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let columns = curves
        .iter()
        .map(|(_, curve)| {
            let points = curve.points();
            let mut next = 0;
            let mut last = None;
            dates
                .iter()
                .map(|date| {
                    // Curve dates are strictly increasing, so one cursor suffices.
                    while next < points.len() && points[next].date <= *date {
                        last = Some(points[next].value);
                        next += 1;
                    }
                    last
                })
                .collect()
        })
        .collect();

    AlignedCurves {
        dates,
        names: curves.iter().map(|(n, _)| n.to_string()).collect(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curvelab_core::EquityPoint;

    fn curve(points: &[(u32, f64)]) -> EquityCurve {
        EquityCurve::from_points(
            points
                .iter()
                .map(|&(day, value)| EquityPoint {
                    date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                    value,
                    cash: value,
                    position: 0,
                })
                .collect(),
        )
    }

    #[test]
    fn union_of_dates_with_forward_fill() {
        let a = curve(&[(2, 100.0), (3, 101.0), (5, 103.0)]);
        let b = curve(&[(3, 50.0), (4, 51.0)]);
        let aligned = align_curves([("a", &a), ("b", &b)]);

        assert_eq!(aligned.len(), 4);
        assert_eq!(
            aligned.column("a").unwrap(),
            &[Some(100.0), Some(101.0), Some(101.0), Some(103.0)]
        );
        assert_eq!(aligned.column("b").unwrap(), &[None, Some(50.0), Some(51.0), Some(51.0)]);
    }

    #[test]
    fn identical_dates_are_a_plain_join() {
        let a = curve(&[(2, 1.0), (3, 2.0)]);
        let b = curve(&[(2, 3.0), (3, 4.0)]);
        let aligned = align_curves([("a", &a), ("b", &b)]);
        assert_eq!(aligned.row(1).unwrap().1, vec![Some(2.0), Some(4.0)]);
        assert!(aligned.row(2).is_none());
    }

    #[test]
    fn no_curves_is_empty() {
        let aligned = align_curves(std::iter::empty::<(&str, &EquityCurve)>());
        assert!(aligned.is_empty());
        assert!(aligned.names.is_empty());
    }
}
