//! Order types and the order lifecycle state machine.
//!
//! ```text
//! Submitted ──► Accepted ──► Completed
//!     │            ├───────► Canceled
//!     │            ├───────► MarginCall
//!     │            └───────► Rejected
//!     ├──► Rejected
//!     └──► Canceled
//! ```
//!
//! Terminal states never transition again. "Idle" is not a status: it is the
//! absence of an order in the broker's pending slot.

use super::ids::OrderId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for buys, -1 for sells.
    pub fn sign(self) -> i64 {
        match self {
            OrderSide::Buy => 1,
            OrderSide::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Order lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    Accepted,
    Completed,
    Canceled,
    MarginCall,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Canceled
                | OrderStatus::MarginCall
                | OrderStatus::Rejected
        )
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Submitted, Accepted)
                | (Submitted, Rejected)
                | (Submitted, Canceled)
                | (Accepted, Completed)
                | (Accepted, Canceled)
                | (Accepted, MarginCall)
                | (Accepted, Rejected)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Submitted => "Submitted",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Completed => "Completed",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::MarginCall => "Margin",
            OrderStatus::Rejected => "Rejected",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    #[error("order {id}: illegal transition {from} -> {to}")]
    IllegalTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("order {pending} is still open; cannot submit another")]
    SlotOccupied { pending: OrderId },
}

/// A single market order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub size: i64,
    pub status: OrderStatus,
    pub created_bar: usize,
    pub created_date: NaiveDate,
    /// Bar on which the order reached a terminal status.
    pub closed_bar: Option<usize>,
}

impl Order {
    pub fn new(id: OrderId, side: OrderSide, size: i64, bar_index: usize, date: NaiveDate) -> Self {
        Self {
            id,
            side,
            size,
            status: OrderStatus::Submitted,
            created_bar: bar_index,
            created_date: date,
            closed_bar: None,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Move to `next`, recording the bar on which a terminal status was reached.
    pub fn transition(&mut self, next: OrderStatus, bar_index: usize) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::IllegalTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next.is_terminal() {
            self.closed_bar = Some(bar_index);
        }
        Ok(())
    }
}
