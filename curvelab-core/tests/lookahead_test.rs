//! Look-ahead contamination tests for every strategy.
//!
//! No decision or equity value at bar t may depend on bars after t.
//!
//! Method: run on a truncated feed (bars 0..100) and on the full feed
//! (bars 0..200). Intents and equity for bars 0..100 must be identical; any
//! difference means a future bar leaked into a past decision.

use chrono::NaiveDate;
use curvelab_core::smoothing::{ema_series, hp_filter, lowess, LOWESS_ROBUST_ITERATIONS};
use curvelab_core::{run_backtest, Bar, BarFeed, FillTiming, RunConfig, StrategySpec};

/// N bars of a deterministic pseudo-random walk.
fn make_test_feed(n: usize) -> BarFeed {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price: f64 = 100.0;

    for i in 0..n {
        // LCG step; keep the high bits, the low ones cycle quickly
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let change = (((seed >> 33) % 200) as f64 - 100.0) * 0.03;
        let open = price;
        price = (price + change).max(10.0);
        let close = price;

        bars.push(Bar::new(
            base_date + chrono::Duration::days(i as i64),
            open,
            open.max(close) + 1.0,
            open.min(close) - 1.0,
            close,
            1_000.0 + i as f64 * 10.0,
        ));
    }

    BarFeed::new("TEST", bars).unwrap()
}

fn all_strategies() -> Vec<(&'static str, StrategySpec)> {
    vec![
        (
            "EMA Crossover",
            StrategySpec::EmaCrossover {
                fast_period: 5,
                slow_period: 12,
                stake: 1,
            },
        ),
        ("MA Direction", StrategySpec::MaDirection { period: 8, stake: 1 }),
        (
            "HP Filter",
            StrategySpec::HpFilter {
                lambda: 1600.0,
                stake: 1,
            },
        ),
        (
            "Lowess",
            StrategySpec::Lowess {
                fraction: 0.25,
                stake: 1,
            },
        ),
    ]
}

fn assert_no_lookahead(name: &str, spec: &StrategySpec, config: &RunConfig, truncated_len: usize) {
    let full = make_test_feed(200);
    let truncated = full.truncated(truncated_len).unwrap();

    let full_run = run_backtest(name, spec, config, &full).unwrap();
    let truncated_run = run_backtest(name, spec, config, &truncated).unwrap();

    assert_eq!(
        truncated_run.intents[..],
        full_run.intents[..truncated_len],
        "{name}: intents differ within the shared prefix"
    );
    assert_eq!(
        truncated_run.equity.points(),
        &full_run.equity.points()[..truncated_len],
        "{name}: equity differs within the shared prefix"
    );
}

#[test]
fn no_lookahead_same_bar_close() {
    for (name, spec) in all_strategies() {
        assert_no_lookahead(name, &spec, &RunConfig::default(), 100);
    }
}

#[test]
fn no_lookahead_next_bar_open() {
    let config = RunConfig {
        fill_timing: FillTiming::NextBarOpen,
        ..RunConfig::default()
    };
    for (name, spec) in all_strategies() {
        assert_no_lookahead(name, &spec, &config, 100);
    }
}

#[test]
fn ema_prefix_is_stable() {
    let closes = make_test_feed(200).closes();
    let full = ema_series(&closes, 10).unwrap();
    let truncated = ema_series(&closes[..100], 10).unwrap();
    assert_eq!(truncated[..], full[..100]);
}

#[test]
fn two_sided_filters_are_evaluated_on_history_only() {
    // The last point of a fit over bars 0..=t is what the strategy sees at t.
    // Refitting with more data changes earlier points, which is why the
    // signals refit on every bar instead of filtering once up front.
    let closes = make_test_feed(200).closes();
    let t = 99;

    let hp_hist = hp_filter(&closes[..=t], 1600.0).unwrap().unwrap();
    let hp_full = hp_filter(&closes, 1600.0).unwrap().unwrap();
    assert_ne!(hp_hist.trend[t], hp_full.trend[t]);

    let lo_hist = lowess(&closes[..=t], 0.25, LOWESS_ROBUST_ITERATIONS).unwrap().unwrap();
    let lo_full = lowess(&closes, 0.25, LOWESS_ROBUST_ITERATIONS).unwrap().unwrap();
    assert_ne!(lo_hist[t], lo_full[t]);
}
