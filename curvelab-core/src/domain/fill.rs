//! Fill: an executed order.

use super::ids::OrderId;
use super::order::OrderSide;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub side: OrderSide,
    pub bar_index: usize,
    pub date: NaiveDate,
    pub price: f64,
    pub size: i64,
    /// `price * size`, always positive.
    pub notional: f64,
    pub commission: f64,
}

impl Fill {
    /// Signed cash movement caused by the fill, commission included.
    pub fn cash_delta(&self) -> f64 {
        match self.side {
            OrderSide::Buy => -(self.notional + self.commission),
            OrderSide::Sell => self.notional - self.commission,
        }
    }
}
