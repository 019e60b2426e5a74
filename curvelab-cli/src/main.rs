//! CurveLab CLI: run strategy suites and inspect bar feeds.
//!
//! Commands:
//! - `run`: execute every strategy of a TOML suite (or the built-in reference suite)
//! - `inspect`: validate a CSV feed and print its summary

mod obs;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use curvelab_core::data::{CsvProvider, DataProvider};
use curvelab_core::FeedRequest;
use curvelab_runner::{
    run_config, save_artifacts, BacktestConfig, LoadOptions, SourceKind, SuiteResult,
};

use obs::LogFormat;

#[derive(Parser)]
#[command(name = "curvelab", about = "CurveLab CLI: smoothing-filter strategy backtests")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every strategy in a suite over one feed.
    Run {
        /// Path to a TOML suite config. Defaults to the reference suite.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read bars from this CSV file instead of the configured source.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Override the configured symbol.
        #[arg(long)]
        symbol: Option<String>,

        /// Fall back to synthetic bars when the data source fails.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), exclusive.
        #[arg(long)]
        end: Option<String>,

        /// Output directory for artifacts.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load a CSV feed and print bar count, date range and dataset hash.
    Inspect {
        #[arg(long)]
        csv: PathBuf,

        /// Symbol label for the feed.
        #[arg(long, default_value = "CSV")]
        symbol: String,

        /// chrono format of the date column.
        #[arg(long)]
        date_format: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    obs::init_tracing("info", cli.log_format)?;

    match cli.command {
        Commands::Run {
            config,
            csv,
            symbol,
            synthetic,
            start,
            end,
            output,
        } => run_cmd(RunArgs {
            config,
            csv,
            symbol,
            synthetic,
            start,
            end,
            output,
        }),
        Commands::Inspect {
            csv,
            symbol,
            date_format,
        } => inspect_cmd(csv, symbol, date_format),
    }
}

struct RunArgs {
    config: Option<PathBuf>,
    csv: Option<PathBuf>,
    symbol: Option<String>,
    synthetic: bool,
    start: Option<String>,
    end: Option<String>,
    output: Option<PathBuf>,
}

fn parse_date(raw: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    raw.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("--{flag} must be YYYY-MM-DD"))
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => BacktestConfig::from_file(path)?,
        None => BacktestConfig::reference(),
    };

    if let Some(path) = args.csv {
        config.data.source = SourceKind::Csv;
        config.data.path = Some(path);
    }
    if let Some(symbol) = args.symbol {
        config.data.symbol = symbol;
    }
    if let Some(start) = parse_date(args.start.as_deref(), "start")? {
        config.data.start = Some(start);
    }
    if let Some(end) = parse_date(args.end.as_deref(), "end")? {
        config.data.end = Some(end);
    }
    if let Some(dir) = args.output {
        config.output.directory = dir;
    }
    config.validate()?;

    let opts = LoadOptions {
        synthetic_fallback: args.synthetic,
    };
    let suite = run_config(&config, &opts)?;

    print_summary(&suite);

    let written = save_artifacts(&suite, &config.output.directory)?;
    println!(
        "Artifacts saved to: {} ({} files)",
        config.output.directory.display(),
        written.len()
    );
    Ok(())
}

fn inspect_cmd(csv: PathBuf, symbol: String, date_format: Option<String>) -> Result<()> {
    let mut provider = CsvProvider::new(&csv);
    if let Some(format) = date_format {
        provider = provider.with_date_format(format);
    }
    let feed = provider
        .fetch(&FeedRequest::new(symbol))
        .with_context(|| format!("failed to load {}", csv.display()))?;

    let bars = feed.bars();
    println!("File:           {}", csv.display());
    println!("Symbol:         {}", feed.symbol());
    println!("Bars:           {}", feed.len());
    println!("Period:         {} to {}", feed.first_date(), feed.last_date());
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("First close:    {:.4}", first.close);
        println!("Last close:     {:.4}", last.close);
    }
    println!("Dataset hash:   {}", feed.content_hash().0);
    Ok(())
}

fn print_summary(suite: &SuiteResult) {
    for run in &suite.runs {
        let s = &run.summary;
        println!();
        println!("=== Running {} ===", run.name);
        println!("Starting Portfolio Value: {:.2}", s.starting_value);
        println!("Final Portfolio Value:    {:.2}", s.final_value);
        println!("Net Change:               {:.2}", s.net_change);
    }

    println!();
    println!("=== Comparison: {} ({} bars) ===", suite.symbol, suite.curves.len());
    println!(
        "{:<16} {:>12} {:>9} {:>8} {:>9} {:>7} {:>8}",
        "Strategy", "Final", "Return", "Sharpe", "Max DD", "Trades", "Win"
    );
    println!("{}", "-".repeat(75));
    for run in &suite.runs {
        let s = &run.summary;
        println!(
            "{:<16} {:>12.2} {:>8.2}% {:>8.3} {:>8.2}% {:>7} {:>7.1}%",
            run.name,
            s.final_value,
            s.total_return * 100.0,
            s.sharpe,
            s.max_drawdown * 100.0,
            s.trade_count,
            s.win_rate * 100.0
        );
    }
    if suite.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
