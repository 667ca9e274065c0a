use polybot_core::{InstrumentId, ValidationError};
use thiserror::Error;

/// Errors raised while applying book inputs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Invalid book level: {0}")]
    InvalidLevel(#[from] ValidationError),

    #[error("Book {0} is awaiting a snapshot after reset")]
    AwaitingSnapshot(InstrumentId),
}

pub type BookResult<T> = Result<T, BookError>;

/// Failure reported by a strategy callback
///
/// The router logs it and treats the callback as having returned no orders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Strategy failed: {0}")]
    Failed(String),

    #[error("Missing state for instrument {0}")]
    MissingState(InstrumentId),

    #[error("Strategy panicked: {0}")]
    Panicked(String),
}

impl StrategyError {
    pub fn failed(message: impl Into<String>) -> Self {
        StrategyError::Failed(message.into())
    }
}
