//! Artifact export: per-strategy JSON and the aligned equity table as CSV.
//!
//! Layout under the output directory:
//! - `<strategy>.json`: summary, trades, equity curve, audit trail
//! - `equity_curves.csv`: one `date` column plus one column per strategy
//!
//! Every JSON artifact carries a `schema_version` field.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use curvelab_core::domain::TradeRecord;
use serde::Serialize;

use crate::align::AlignedCurves;
use crate::runner::{StrategyRun, SuiteResult};

#[derive(Serialize)]
struct StrategyArtifact<'a> {
    schema_version: u32,
    symbol: &'a str,
    has_synthetic: bool,
    #[serde(flatten)]
    run: &'a StrategyRun,
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize one strategy run with suite provenance to pretty JSON.
pub fn export_json(suite: &SuiteResult, run: &StrategyRun) -> Result<String> {
    let artifact = StrategyArtifact {
        schema_version: suite.schema_version,
        symbol: &suite.symbol,
        has_synthetic: suite.has_synthetic,
        run,
    };
    serde_json::to_string_pretty(&artifact)
        .with_context(|| format!("failed to serialize run '{}' to JSON", run.name))
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Aligned equity table. Missing values are written as empty cells.
pub fn export_curves_csv(curves: &AlignedCurves) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date".to_string()];
    header.extend(curves.names.iter().cloned());
    wtr.write_record(&header)?;

    for (i, date) in curves.dates.iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(
            curves
                .columns
                .iter()
                .map(|col| col[i].map(|v| format!("{v:.2}")).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Trade tape, one row per round trip.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_bar",
        "entry_date",
        "entry_price",
        "exit_bar",
        "exit_date",
        "exit_price",
        "size",
        "gross_pnl",
        "commission",
        "net_pnl",
        "bars_held",
    ])?;
    for t in trades {
        wtr.write_record([
            &t.entry_bar.to_string(),
            &t.entry_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit_bar.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.exit_price),
            &t.size.to_string(),
            &format!("{:.2}", t.gross_pnl),
            &format!("{:.2}", t.commission),
            &format!("{:.2}", t.net_pnl),
            &t.bars_held.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// File stem for a strategy name: lowercase ASCII alphanumerics joined by `_`.
pub fn artifact_stem(name: &str) -> String {
    let stem = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() {
        "strategy".to_string()
    } else {
        stem
    }
}

/// Write the full artifact set for a suite into `output_dir`.
///
/// Returns the written file paths, strategy files first in run order.
pub fn save_artifacts(suite: &SuiteResult, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(suite.runs.len() * 2 + 1);
    for run in &suite.runs {
        let stem = artifact_stem(&run.name);

        let path = output_dir.join(format!("{stem}.json"));
        std::fs::write(&path, export_json(suite, run)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);

        let path = output_dir.join(format!("{stem}_trades.csv"));
        std::fs::write(&path, export_trades_csv(&run.result.trades)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    let path = output_dir.join("equity_curves.csv");
    std::fs::write(&path, export_curves_csv(&suite.curves)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);

    tracing::info!(dir = %output_dir.display(), files = written.len(), "artifacts saved");
    Ok(written)
}
