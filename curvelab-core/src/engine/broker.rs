//! Broker: the order and position state machine for one strategy run.
//!
//! Holds at most one open order. Submission moves an order through
//! `Submitted` to `Accepted` (or straight to `Rejected`); execution moves it to
//! `Completed` or `MarginCall`; an unfilled order can be `Canceled`. Any
//! terminal status clears the pending slot. Cash and position change only on
//! `Completed`, together, through [`Portfolio::apply_fill`].

use super::audit::{AuditKind, AuditLog};
use crate::domain::{
    Fill, Order, OrderError, OrderId, OrderSide, OrderStatus, Portfolio, Position, TradeRecord,
};
use crate::signal::Reading;
use chrono::NaiveDate;

/// Entry leg of the currently open round trip.
#[derive(Debug, Clone, Copy)]
struct OpenTrade {
    bar_index: usize,
    date: NaiveDate,
    price: f64,
    commission: f64,
}

/// Everything the broker accumulated over a run.
#[derive(Debug, Clone)]
pub struct BrokerLedger {
    pub portfolio: Portfolio,
    pub orders: Vec<Order>,
    pub fills: Vec<Fill>,
    pub trades: Vec<TradeRecord>,
}

#[derive(Debug, Clone)]
pub struct Broker {
    portfolio: Portfolio,
    commission_rate: f64,
    pending: Option<Order>,
    open_trade: Option<OpenTrade>,
    next_id: u64,
    /// Orders that reached a terminal status, in completion order.
    orders: Vec<Order>,
    fills: Vec<Fill>,
    trades: Vec<TradeRecord>,
}

impl Broker {
    pub fn new(initial_cash: f64, commission_rate: f64) -> Self {
        Self {
            portfolio: Portfolio::new(initial_cash),
            commission_rate,
            pending: None,
            open_trade: None,
            next_id: 1,
            orders: Vec::new(),
            fills: Vec::new(),
            trades: Vec::new(),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn position(&self) -> &Position {
        &self.portfolio.position
    }

    pub fn cash(&self) -> f64 {
        self.portfolio.cash
    }

    pub fn pending(&self) -> Option<&Order> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Submit a market order created on `bar_index`.
    ///
    /// The order is accepted immediately unless it can never fill: a
    /// non-positive size, a buy while already long, or a sell larger than the
    /// position are rejected on the spot. Fails only if another order is
    /// still open.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        side: OrderSide,
        size: i64,
        bar_index: usize,
        date: NaiveDate,
        reference_price: f64,
        reading: Option<Reading>,
        audit: &mut AuditLog,
    ) -> Result<OrderId, OrderError> {
        if let Some(pending) = &self.pending {
            return Err(OrderError::SlotOccupied { pending: pending.id });
        }

        let id = OrderId(self.next_id);
        self.next_id += 1;
        let mut order = Order::new(id, side, size, bar_index, date);
        audit.record(
            bar_index,
            date,
            AuditKind::OrderSubmitted {
                order_id: id,
                side,
                size,
                reference_price,
                indicator: reading.map(|r| r.label.to_string()),
                indicator_value: reading.map(|r| r.value),
            },
        );

        let held = self.portfolio.position.size;
        let rejection = if size <= 0 {
            Some(format!("size must be positive (got {size})"))
        } else if side == OrderSide::Buy && held > 0 {
            Some(format!("already long {held}"))
        } else if side == OrderSide::Sell && size > held {
            Some(format!("sell size {size} exceeds position {held}"))
        } else {
            None
        };

        match rejection {
            Some(reason) => {
                order.transition(OrderStatus::Rejected, bar_index)?;
                self.fail(order, reason, date, audit);
            }
            None => {
                order.transition(OrderStatus::Accepted, bar_index)?;
                self.pending = Some(order);
            }
        }
        Ok(id)
    }

    /// Execute the accepted order at `price`.
    ///
    /// A buy whose notional plus commission exceeds cash ends in
    /// `MarginCall` with no change to cash or position. Returns the fill on
    /// success, `None` when nothing was pending or the order failed.
    pub fn execute_pending(
        &mut self,
        price: f64,
        bar_index: usize,
        date: NaiveDate,
        audit: &mut AuditLog,
    ) -> Result<Option<Fill>, OrderError> {
        let Some(mut order) = self.pending.take() else {
            return Ok(None);
        };

        let notional = price * order.size as f64;
        let commission = notional * self.commission_rate;

        match order.side {
            OrderSide::Buy if notional + commission > self.portfolio.cash => {
                let reason = format!(
                    "insufficient cash: need {:.2}, have {:.2}",
                    notional + commission,
                    self.portfolio.cash
                );
                order.transition(OrderStatus::MarginCall, bar_index)?;
                self.fail(order, reason, date, audit);
                return Ok(None);
            }
            OrderSide::Sell if order.size > self.portfolio.position.size => {
                let reason = format!(
                    "sell size {} exceeds position {}",
                    order.size, self.portfolio.position.size
                );
                order.transition(OrderStatus::Rejected, bar_index)?;
                self.fail(order, reason, date, audit);
                return Ok(None);
            }
            _ => {}
        }

        order.transition(OrderStatus::Completed, bar_index)?;
        let fill = Fill {
            order_id: order.id,
            side: order.side,
            bar_index,
            date,
            price,
            size: order.size,
            notional,
            commission,
        };
        let realized = self.portfolio.apply_fill(&fill);
        audit.record(
            bar_index,
            date,
            AuditKind::OrderExecuted {
                order_id: order.id,
                side: order.side,
                price,
                size: order.size,
                notional,
                commission,
            },
        );

        match order.side {
            OrderSide::Buy => {
                self.open_trade = Some(OpenTrade {
                    bar_index,
                    date,
                    price,
                    commission,
                });
            }
            OrderSide::Sell => {
                if let (Some(entry), Some(gross_pnl)) = (self.open_trade.take(), realized) {
                    let total_commission = entry.commission + commission;
                    let trade = TradeRecord {
                        entry_bar: entry.bar_index,
                        entry_date: entry.date,
                        entry_price: entry.price,
                        exit_bar: bar_index,
                        exit_date: date,
                        exit_price: price,
                        size: fill.size,
                        gross_pnl,
                        commission: total_commission,
                        net_pnl: gross_pnl - total_commission,
                        bars_held: bar_index - entry.bar_index,
                    };
                    audit.record(
                        bar_index,
                        date,
                        AuditKind::TradeClosed {
                            gross_pnl: trade.gross_pnl,
                            net_pnl: trade.net_pnl,
                        },
                    );
                    self.trades.push(trade);
                }
            }
        }

        self.fills.push(fill.clone());
        self.orders.push(order);
        Ok(Some(fill))
    }

    /// Cancel the open order, if any.
    pub fn cancel_pending(
        &mut self,
        bar_index: usize,
        date: NaiveDate,
        reason: &str,
        audit: &mut AuditLog,
    ) -> Result<Option<OrderId>, OrderError> {
        let Some(mut order) = self.pending.take() else {
            return Ok(None);
        };
        order.transition(OrderStatus::Canceled, bar_index)?;
        audit.record(
            bar_index,
            date,
            AuditKind::OrderCanceled {
                order_id: order.id,
                side: order.side,
                reason: reason.to_string(),
            },
        );
        let id = order.id;
        self.orders.push(order);
        Ok(Some(id))
    }

    /// Mark-to-market value at `close`.
    pub fn equity(&self, close: f64) -> f64 {
        self.portfolio.equity(close)
    }

    pub fn into_ledger(self) -> BrokerLedger {
        BrokerLedger {
            portfolio: self.portfolio,
            orders: self.orders,
            fills: self.fills,
            trades: self.trades,
        }
    }

    fn fail(&mut self, order: Order, reason: String, date: NaiveDate, audit: &mut AuditLog) {
        audit.record(
            order.closed_bar.unwrap_or(order.created_bar),
            date,
            AuditKind::OrderFailed {
                order_id: order.id,
                side: order.side,
                status: order.status,
                reason,
            },
        );
        self.orders.push(order);
    }
}
