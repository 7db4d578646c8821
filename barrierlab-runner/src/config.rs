//! Batch configuration, loadable from TOML.
//!
//! ```toml
//! per_trade_cost_rate = 0.0004
//! parallel = true
//! num_threads = 8
//! ```
//!
//! Every field is optional; missing fields take the [`BatchConfig::default`]
//! values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a [`BatchConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("per_trade_cost_rate must be finite and in [0, 1), got {0}")]
    InvalidCostRate(f64),
    #[error("num_threads must be non-zero")]
    InvalidThreads,
}

/// Settings shared by every simulation in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Fee rate charged on each leg of the round trip.
    pub per_trade_cost_rate: f64,
    /// Run simulations on the rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Dedicated pool size; `None` uses rayon's global pool.
    pub num_threads: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            per_trade_cost_rate: 0.0,
            parallel: true,
            num_threads: None,
        }
    }
}

impl BatchConfig {
    pub fn new(per_trade_cost_rate: f64) -> Self {
        Self {
            per_trade_cost_rate,
            ..Self::default()
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Load and validate from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.per_trade_cost_rate;
        if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
            return Err(ConfigError::InvalidCostRate(rate));
        }
        if self.num_threads == Some(0) {
            return Err(ConfigError::InvalidThreads);
        }
        Ok(())
    }
}
