//! Audit trail: every externally observable per-order effect of a run.
//!
//! Events are kept on the run result and mirrored to `tracing`, so tests can
//! assert on them without installing a subscriber.

use crate::domain::{OrderId, OrderSide, OrderStatus};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditKind {
    OrderSubmitted {
        order_id: OrderId,
        side: OrderSide,
        size: i64,
        /// Close of the decision bar.
        reference_price: f64,
        indicator: Option<String>,
        indicator_value: Option<f64>,
    },
    OrderExecuted {
        order_id: OrderId,
        side: OrderSide,
        price: f64,
        size: i64,
        notional: f64,
        commission: f64,
    },
    /// Terminal failure: margin call or rejection.
    OrderFailed {
        order_id: OrderId,
        side: OrderSide,
        status: OrderStatus,
        reason: String,
    },
    OrderCanceled {
        order_id: OrderId,
        side: OrderSide,
        reason: String,
    },
    TradeClosed {
        gross_pnl: f64,
        net_pnl: f64,
    },
    IndicatorUnavailable {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub bar_index: usize,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: AuditKind,
}

/// Collects audit events for one strategy run.
#[derive(Debug, Clone)]
pub struct AuditLog {
    strategy: String,
    events: Vec<AuditEvent>,
}

impl AuditLog {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<AuditEvent> {
        self.events
    }

    pub fn record(&mut self, bar_index: usize, date: NaiveDate, kind: AuditKind) {
        let strategy = self.strategy.as_str();
        match &kind {
            AuditKind::OrderSubmitted {
                order_id,
                side,
                size,
                reference_price,
                indicator,
                indicator_value,
            } => tracing::info!(
                strategy,
                bar = bar_index,
                %date,
                %order_id,
                %side,
                size,
                price = reference_price,
                indicator = indicator.as_deref().unwrap_or("-"),
                indicator_value = indicator_value.unwrap_or(f64::NAN),
                "order submitted"
            ),
            AuditKind::OrderExecuted {
                order_id,
                side,
                price,
                size,
                notional,
                commission,
            } => tracing::info!(
                strategy,
                bar = bar_index,
                %date,
                %order_id,
                %side,
                price,
                size,
                notional,
                commission,
                "order executed"
            ),
            AuditKind::OrderFailed {
                order_id,
                side,
                status,
                reason,
            } => tracing::warn!(
                strategy,
                bar = bar_index,
                %date,
                %order_id,
                %side,
                %status,
                reason = reason.as_str(),
                "order failed"
            ),
            AuditKind::OrderCanceled {
                order_id,
                side,
                reason,
            } => tracing::warn!(
                strategy,
                bar = bar_index,
                %date,
                %order_id,
                %side,
                reason = reason.as_str(),
                "order canceled"
            ),
            AuditKind::TradeClosed { gross_pnl, net_pnl } => tracing::info!(
                strategy,
                bar = bar_index,
                %date,
                gross_pnl,
                net_pnl,
                "trade closed"
            ),
            AuditKind::IndicatorUnavailable { reason } => tracing::debug!(
                strategy,
                bar = bar_index,
                %date,
                reason = reason.as_str(),
                "indicator unavailable"
            ),
        }
        self.events.push(AuditEvent {
            bar_index,
            date,
            kind,
        });
    }
}
