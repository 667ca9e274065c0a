//! Engine configuration
//!
//! Loaded from JSON. Every field has a default so an empty object is a valid
//! config.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with market data for instruments no strategy is registered on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnroutedPolicy {
    /// Keep the book up to date without invoking any callback
    #[default]
    WarmBook,
    /// Discard the event without touching any state
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of run-to-completion processing units
    #[serde(default = "default_shard_count")]
    pub shard_count: usize,

    /// Bound of each shard inbox and of the outbound order queue
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default)]
    pub unrouted_market_data: UnroutedPolicy,
}

fn default_shard_count() -> usize {
    1
}

fn default_channel_capacity() -> usize {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shard_count: default_shard_count(),
            channel_capacity: default_channel_capacity(),
            unrouted_market_data: UnroutedPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shard_count == 0 {
            return Err(ConfigError::Invalid("shard_count must be at least 1".into()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn with_shard_count(mut self, n: usize) -> Self {
        self.shard_count = n;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_unrouted_policy(mut self, policy: UnroutedPolicy) -> Self {
        self.unrouted_market_data = policy;
        self
    }
}
