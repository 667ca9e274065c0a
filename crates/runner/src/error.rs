//! Runner errors
//!
//! Only startup misconfiguration is an error here. Everything that can go wrong
//! while events flow is handled inside the pipeline and logged.

use polybot_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Strategy {strategy} registered with no instruments")]
    EmptyInstrumentSet { strategy: String },

    #[error("Strategy {strategy} has no limit for instrument {instrument_id}")]
    MissingLimit {
        strategy: String,
        instrument_id: String,
    },

    #[error("Strategy name already registered: {0}")]
    DuplicateStrategy(String),

    #[error("Strategy {strategy} supplied an invalid limit: {source}")]
    InvalidLimit {
        strategy: String,
        #[source]
        source: ValidationError,
    },

    #[error("Engine already started, registrations are closed")]
    AlreadyStarted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Shard {0} shut down while events were pending")]
    ShardShutdown(usize),

    #[error("Engine task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
