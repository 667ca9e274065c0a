//! Order Manager errors

use polybot_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("No limit registered for instrument: {0}")]
    UnknownInstrument(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, Error>;
