//! Validation errors for domain values

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Order price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("Order volume must be positive, got {0}")]
    NonPositiveVolume(Decimal),

    #[error("Empty instrument id")]
    EmptyInstrumentId,

    #[error("Limit {field} for {instrument_id} must be non-negative, got {value}")]
    NegativeLimit {
        instrument_id: String,
        field: &'static str,
        value: Decimal,
    },

    #[error("Book level price must be positive, got {0}")]
    InvalidLevelPrice(Decimal),

    #[error("Book level size must be non-negative, got {0}")]
    InvalidLevelSize(Decimal),
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
