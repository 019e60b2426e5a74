//! Position: the instrument holding. Long-only: size is never negative.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub size: i64,
    /// Average cost per unit of the open size; 0.0 when flat.
    pub avg_entry_price: f64,
}

impl Position {
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.size == 0
    }

    pub fn is_long(&self) -> bool {
        self.size > 0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.size as f64 * price
    }

    pub fn cost_basis(&self) -> f64 {
        self.size as f64 * self.avg_entry_price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.size as f64 * (price - self.avg_entry_price)
    }

    /// Add `size` units bought at `price`, re-averaging the cost.
    pub fn add(&mut self, size: i64, price: f64) {
        let total = self.size + size;
        if total > 0 {
            self.avg_entry_price = (self.cost_basis() + size as f64 * price) / total as f64;
        }
        self.size = total;
    }

    /// Remove `size` units. Returns the cost basis of the removed units.
    pub fn reduce(&mut self, size: i64) -> f64 {
        let removed_cost = size as f64 * self.avg_entry_price;
        self.size -= size;
        if self.size == 0 {
            self.avg_entry_price = 0.0;
        }
        removed_cost
    }
}
