use anyhow::{Context, Result};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber. `CURVELAB_LOG` overrides `default_filter`.
///
/// Logs go to stderr so stdout carries only the run summary.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> Result<()> {
    let filter = std::env::var("CURVELAB_LOG").unwrap_or_else(|_| default_filter.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .with_context(|| format!("invalid log filter: {filter}"))?;

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}
