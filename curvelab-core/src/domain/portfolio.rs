//! Portfolio: cash plus the single open position.

use super::fill::Fill;
use super::order::OrderSide;
use super::position::Position;

/// Aggregate account state.
///
/// The cost accounting identity holds after every fill:
/// `cash + position.cost_basis() == initial_cash + realized_pnl - total_commission`.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_cash: f64,
    pub position: Position,
    pub realized_pnl: f64,
    pub total_commission: f64,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            position: Position::flat(),
            realized_pnl: 0.0,
            total_commission: 0.0,
        }
    }

    /// Mark-to-market value at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position.market_value(price)
    }

    /// Apply an executed fill, moving cash and position together.
    /// Returns the gross realized PnL for sells.
    pub fn apply_fill(&mut self, fill: &Fill) -> Option<f64> {
        self.cash += fill.cash_delta();
        self.total_commission += fill.commission;
        match fill.side {
            OrderSide::Buy => {
                self.position.add(fill.size, fill.price);
                None
            }
            OrderSide::Sell => {
                let cost = self.position.reduce(fill.size);
                let gross = fill.notional - cost;
                self.realized_pnl += gross;
                Some(gross)
            }
        }
    }

    /// Difference between the two sides of the cost accounting identity.
    pub fn accounting_gap(&self) -> f64 {
        let lhs = self.cash + self.position.cost_basis();
        let rhs = self.initial_cash + self.realized_pnl - self.total_commission;
        lhs - rhs
    }
}
