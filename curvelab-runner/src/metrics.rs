//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity values, bar returns or the trade
//! list in, scalar out. Bar returns come from [`EquityCurve::returns`].

use curvelab_core::domain::TradeRecord;
use curvelab_core::EquityCurve;
use serde::{Deserialize, Serialize};

/// Trading days per year used for annualisation.
pub const TRADING_DAYS: f64 = 252.0;

/// Aggregate performance of one strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub starting_value: f64,
    pub final_value: f64,
    pub net_change: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_commission: f64,
}

impl PerformanceSummary {
    pub fn compute(equity: &EquityCurve, trades: &[TradeRecord], total_commission: f64) -> Self {
        let values = equity.values();
        let returns: Vec<f64> = equity.returns().into_iter().map(|(_, r)| r).collect();
        let starting_value = values.first().copied().unwrap_or(0.0);
        let final_value = values.last().copied().unwrap_or(starting_value);
        Self {
            starting_value,
            final_value,
            net_change: final_value - starting_value,
            total_return: total_return(&values),
            cagr: cagr(&values),
            sharpe: sharpe_ratio(&returns, 0.0),
            sortino: sortino_ratio(&returns, 0.0),
            max_drawdown: max_drawdown(&values),
            trade_count: trades.len(),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            total_commission,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&initial), Some(&last)) if values.len() >= 2 && initial > 0.0 => {
            (last - initial) / initial
        }
        _ => 0.0,
    }
}

/// Compound annual growth rate over `values.len()` trading days.
pub fn cagr(values: &[f64]) -> f64 {
    let (Some(&initial), Some(&last)) = (values.first(), values.last()) else {
        return 0.0;
    };
    if values.len() < 2 || initial <= 0.0 || last <= 0.0 {
        return 0.0;
    }
    let years = values.len() as f64 / TRADING_DAYS;
    (last / initial).powf(1.0 / years) - 1.0
}

/// Annualized Sharpe ratio from bar returns.
///
/// Returns 0.0 with zero variance or fewer than 2 returns.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = excess_returns(returns, risk_free_rate);
    if excess.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&excess);
    if std < 1e-15 {
        return 0.0;
    }
    mean(&excess) / std * TRADING_DAYS.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = excess_returns(returns, risk_free_rate);
    if excess.len() < 2 {
        return 0.0;
    }
    let downside: f64 = excess.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    let downside_std = (downside / excess.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    mean(&excess) / downside_std * TRADING_DAYS.sqrt()
}

/// Maximum drawdown as a negative fraction (-0.15 = 15% drawdown).
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &v in values {
        peak = peak.max(v);
        if peak > 0.0 {
            max_dd = max_dd.min((v - peak) / peak);
        }
    }
    max_dd
}

/// Fraction of trades with positive net PnL.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

/// Gross profits / gross losses, capped at 100.0.
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let (profit, loss) = trades.iter().fold((0.0, 0.0), |(p, l), t| {
        if t.net_pnl > 0.0 {
            (p + t.net_pnl, l)
        } else {
            (p, l - t.net_pnl)
        }
    });
    if loss < 1e-10 {
        return if profit > 0.0 { 100.0 } else { 0.0 };
    }
    (profit / loss).min(100.0)
}

// ─── Helpers ────────────────────────────────────────────────────────

fn excess_returns(returns: &[f64], risk_free_rate: f64) -> Vec<f64> {
    let daily_rf = risk_free_rate / TRADING_DAYS;
    returns.iter().map(|r| r - daily_rf).collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    let variance = sum_sq / (values.len() - 1) as f64;
    variance.sqrt()
}
