use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::Side;
use crate::values::{Notional, Price, Quantity};

/// Exposure held on one instrument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Net quantity (positive = long/bid exposure, negative = short)
    pub quantity: Quantity,
    /// Running notional, signed like the quantity
    pub notional: Notional,
}

impl Position {
    pub fn new(quantity: Quantity, notional: Notional) -> Self {
        Self { quantity, notional }
    }

    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Position after trading `volume` at `price` on `side`
    ///
    /// `None` when the quantity or notional leaves the decimal range.
    pub fn after(&self, side: Side, price: Price, volume: Quantity) -> Option<Position> {
        let sign = side.sign();
        let traded = price.checked_mul(volume)?;
        Some(Position {
            quantity: self.quantity.checked_add(sign * volume)?,
            notional: self.notional.checked_add(sign * traded)?,
        })
    }

    /// Average price of the open exposure, `None` when flat or out of range
    pub fn avg_price(&self) -> Option<Decimal> {
        if self.quantity.is_zero() {
            None
        } else {
            self.notional.checked_div(self.quantity)
        }
    }
}

/// Read-only access to current positions
pub trait PositionReader: Send + Sync {
    /// Current position, flat if the instrument was never traded
    fn position_of(&self, instrument_id: &str) -> Position;
}
