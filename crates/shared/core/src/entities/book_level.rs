use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::values::{Price, Quantity};

/// Order book level (price + size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Quantity,
}

impl BookLevel {
    /// Create a new book level
    pub fn new(price: Price, size: Quantity) -> Self {
        Self { price, size }
    }

    /// Check if this level should be removed (size == 0)
    pub fn is_removed(&self) -> bool {
        self.size.is_zero()
    }

    /// Notional resting at this level
    pub fn notional(&self) -> Decimal {
        self.price * self.size
    }

    /// Price must be positive, size non-negative
    pub fn validate(&self) -> ValidationResult<()> {
        if self.price <= Decimal::ZERO {
            return Err(ValidationError::InvalidLevelPrice(self.price));
        }
        if self.size < Decimal::ZERO {
            return Err(ValidationError::InvalidLevelSize(self.size));
        }
        Ok(())
    }
}
