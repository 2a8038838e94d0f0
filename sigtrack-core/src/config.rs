//! Engine configuration — every tunable threshold in one value.
//!
//! Constructed once at startup and passed by reference to each component.
//! Nothing in the core mutates it after construction.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds and sizing parameters shared by the signal generator, the
/// position tracker, and the replay engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Below this confidence every signal is damped to Hold.
    pub min_confidence: f64,
    /// A direct Buy↔Sell reversal needs at least this much confidence,
    /// otherwise the previous action is kept.
    pub high_confidence: f64,
    /// A confidence drop larger than this between cycles forces Hold.
    pub confidence_drop: f64,
    /// Dollars allocated per Buy at confidence 1.0; scaled linearly down
    /// by the signal's confidence.
    pub base_investment: f64,
    /// Commission rate per side (0.001 = 10 bps). Scales cost up on buys
    /// and proceeds down on sells.
    pub commission: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.70,
            high_confidence: 0.80,
            confidence_drop: 0.10,
            base_investment: 1_000.0,
            commission: 0.0,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: EngineConfig = toml::from_str(&text)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
