//! TradeRecord: a completed round trip: entry buy to exit sell.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Entry ──
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,

    pub size: i64,

    // ── PnL ──
    pub gross_pnl: f64,
    /// Entry and exit commission combined.
    pub commission: f64,
    pub net_pnl: f64,

    pub bars_held: usize,
}

impl TradeRecord {
    /// Net return as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        let cost = self.entry_price * self.size as f64;
        if cost == 0.0 {
            return 0.0;
        }
        self.net_pnl / cost
    }

    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(net_pnl: f64) -> TradeRecord {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        TradeRecord {
            entry_bar: 1,
            entry_date: d,
            entry_price: 100.0,
            exit_bar: 5,
            exit_date: d,
            exit_price: 110.0,
            size: 2,
            gross_pnl: 20.0,
            commission: 20.0 - net_pnl,
            net_pnl,
            bars_held: 4,
        }
    }

    #[test]
    fn return_pct_uses_entry_cost() {
        let t = trade(19.58);
        assert!((t.return_pct() - 0.0979).abs() < 1e-12);
        assert!(t.is_winner());
    }

    #[test]
    fn losing_trade() {
        assert!(!trade(-1.0).is_winner());
    }
}
