//! Property tests for the date-aligned curve join.
//!
//! Properties:
//! 1. Row count is the size of the union of all curves' dates
//! 2. Every column is None before its curve starts and Some afterwards
//! 3. On its own dates a column equals the curve; elsewhere it carries the last value

use std::collections::BTreeSet;

use chrono::NaiveDate;
use curvelab_core::{EquityCurve, EquityPoint};
use curvelab_runner::align_curves;
use proptest::prelude::*;

fn arb_curve() -> impl Strategy<Value = EquityCurve> {
    prop::collection::btree_map(0i64..120, 1.0f64..1e6, 1..40).prop_map(|days| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        EquityCurve::from_points(
            days.into_iter()
                .map(|(day, value)| EquityPoint {
                    date: base + chrono::Duration::days(day),
                    value,
                    cash: value,
                    position: 0,
                })
                .collect(),
        )
    })
}

proptest! {
    #[test]
    fn aligned_table_matches_inputs(curves in prop::collection::vec(arb_curve(), 1..5)) {
        let names: Vec<String> = (0..curves.len()).map(|i| format!("s{i}")).collect();
        let aligned = align_curves(names.iter().map(String::as_str).zip(curves.iter()));

        let union: BTreeSet<NaiveDate> = curves.iter().flat_map(|c| c.dates()).collect();
        prop_assert_eq!(aligned.len(), union.len());
        prop_assert!(aligned.dates.windows(2).all(|w| w[0] < w[1]));

        for (curve, column) in curves.iter().zip(&aligned.columns) {
            let first = curve.points()[0].date;
            for (date, cell) in aligned.dates.iter().zip(column) {
                let expected = curve
                    .points()
                    .iter()
                    .take_while(|p| p.date <= *date)
                    .last()
                    .map(|p| p.value);
                prop_assert_eq!(*cell, expected);
                prop_assert_eq!(cell.is_none(), *date < first);
            }
        }
    }
}
