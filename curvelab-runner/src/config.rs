//! Serializable suite configuration.
//!
//! A suite is one data section, one broker section shared by every run, an
//! output section, and a list of named strategies:
//!
//! ```toml
//! [data]
//! source = "csv"
//! symbol = "SPY"
//! path = "data/spy.csv"
//! start = "2020-01-01"
//!
//! [broker]
//! initial_cash = 10000.0
//! commission_rate = 0.001
//!
//! [[strategies]]
//! name = "EMA Crossover"
//! kind = "ema_crossover"
//! fast_period = 12
//! slow_period = 26
//! stake = 1
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use curvelab_core::{FeedRequest, ParamError, RunConfig, StrategySpec};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a suite configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("strategy '{name}': {source}")]
    Strategy { name: String, source: ParamError },

    #[error("broker: {0}")]
    Broker(ParamError),

    #[error("{0}")]
    Invalid(String),
}

/// Where bars come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Csv,
    Yahoo,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub source: SourceKind,
    pub symbol: String,
    /// CSV file; required when `source = "csv"`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Inclusive.
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Exclusive.
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default)]
    pub date_format: Option<String>,
}

fn default_timeframe() -> String {
    "1d".to_string()
}

impl DataConfig {
    pub fn request(&self) -> FeedRequest {
        FeedRequest::new(self.symbol.clone()).with_range(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("results"),
        }
    }
}

/// A named strategy run. The spec fields sit next to `name` in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    pub name: String,
    #[serde(flatten)]
    pub spec: StrategySpec,
}

impl StrategyEntry {
    pub fn new(name: impl Into<String>, spec: StrategySpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// Full configuration for one suite of strategy runs over one feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub broker: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub strategies: Vec<StrategyEntry>,
}

impl BacktestConfig {
    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.broker.validate().map_err(ConfigError::Broker)?;

        if self.data.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("data.symbol must not be empty".into()));
        }
        if self.data.source == SourceKind::Csv && self.data.path.is_none() {
            return Err(ConfigError::Invalid(
                "data.path is required when data.source = \"csv\"".into(),
            ));
        }
        if let (Some(start), Some(end)) = (self.data.start, self.data.end) {
            if start >= end {
                return Err(ConfigError::Invalid(format!(
                    "data.start ({start}) must be before data.end ({end})"
                )));
            }
        }

        if self.strategies.is_empty() {
            return Err(ConfigError::Invalid("no strategies configured".into()));
        }
        let mut seen = HashSet::new();
        for entry in &self.strategies {
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate strategy name '{}'",
                    entry.name
                )));
            }
            entry.spec.validate().map_err(|source| ConfigError::Strategy {
                name: entry.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// The four-strategy comparison on the BIST 100 index.
    pub fn reference() -> Self {
        let stake = 1;
        Self {
            data: DataConfig {
                source: SourceKind::Yahoo,
                symbol: "^XU100".to_string(),
                path: Some(PathBuf::from("data/sample_data.csv")),
                start: NaiveDate::from_ymd_opt(2000, 1, 1),
                end: NaiveDate::from_ymd_opt(2025, 5, 1),
                timeframe: default_timeframe(),
                date_format: None,
            },
            broker: RunConfig {
                initial_cash: 10_000.0,
                commission_rate: 0.001,
                ..RunConfig::default()
            },
            output: OutputConfig::default(),
            strategies: vec![
                StrategyEntry::new(
                    "EMA Crossover",
                    StrategySpec::EmaCrossover {
                        fast_period: 12,
                        slow_period: 26,
                        stake,
                    },
                ),
                StrategyEntry::new("MA Direction", StrategySpec::MaDirection { period: 20, stake }),
                StrategyEntry::new(
                    "HP Filter",
                    StrategySpec::HpFilter {
                        lambda: 1600.0,
                        stake,
                    },
                ),
                StrategyEntry::new(
                    "Lowess",
                    StrategySpec::Lowess {
                        fraction: 0.10,
                        stake,
                    },
                ),
            ],
        }
    }
}
