use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential order identifier, unique within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Content hash of a bar feed (BLAKE3 hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic run identity: strategy configuration + dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub strategy: String,
    pub params_json: String,
    pub dataset_hash: DatasetHash,
}

impl RunId {
    pub fn new(
        strategy: impl Into<String>,
        params_json: impl Into<String>,
        dataset_hash: DatasetHash,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            params_json: params_json.into(),
            dataset_hash,
        }
    }

    /// Stable hash of the run identity.
    /// Uses BLAKE3 so the value is identical across builds and platforms.
    pub fn hash(&self) -> String {
        use serde_json::json;

        let canonical = json!({
            "dataset_hash": &self.dataset_hash.0,
            "params": &self.params_json,
            "strategy": &self.strategy,
        });

        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}
