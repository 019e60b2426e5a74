use crate::domain::{EquityCurve, EquityPoint, Portfolio};
use chrono::NaiveDate;

/// Per-bar equity recorder.
#[derive(Debug, Clone)]
pub struct EquityTracker {
    points: Vec<EquityPoint>,
}

impl EquityTracker {
    pub fn with_capacity(bars: usize) -> Self {
        Self {
            points: Vec::with_capacity(bars),
        }
    }

    /// Mark the portfolio to `close` and append the point for `date`.
    pub fn record(&mut self, date: NaiveDate, portfolio: &Portfolio, close: f64) -> f64 {
        let value = portfolio.equity(close);

        #[cfg(debug_assertions)]
        {
            if let Some(last) = self.points.last() {
                assert!(date > last.date, "equity dates must increase: {} then {date}", last.date);
            }
            let gap = portfolio.accounting_gap();
            assert!(
                gap.abs() <= 1e-6 * portfolio.initial_cash.max(1.0),
                "cost accounting violated: gap={gap}, cash={}, position={:?}",
                portfolio.cash,
                portfolio.position
            );
        }

        self.points.push(EquityPoint {
            date,
            value,
            cash: portfolio.cash,
            position: portfolio.position.size,
        });
        value
    }

    pub fn finish(self) -> EquityCurve {
        EquityCurve::from_points(self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Fill, OrderId, OrderSide};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn flat_portfolio_records_cash() {
        let portfolio = Portfolio::new(10_000.0);
        let mut tracker = EquityTracker::with_capacity(2);
        tracker.record(date(1), &portfolio, 55.0);
        tracker.record(date(2), &portfolio, 60.0);
        let curve = tracker.finish();
        assert_eq!(curve.values(), vec![10_000.0, 10_000.0]);
    }

    #[test]
    fn long_position_is_marked_to_close() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.apply_fill(&Fill {
            order_id: OrderId(1),
            side: OrderSide::Buy,
            bar_index: 0,
            date: date(1),
            price: 100.0,
            size: 10,
            notional: 1_000.0,
            commission: 1.0,
        });
        let mut tracker = EquityTracker::with_capacity(1);
        let value = tracker.record(date(1), &portfolio, 105.0);
        // 8_999 + 10 * 105
        assert!((value - 10_049.0).abs() < 1e-9);
        let point = tracker.finish().points()[0];
        assert_eq!(point.position, 10);
        assert!((point.cash - 8_999.0).abs() < 1e-9);
    }
}
