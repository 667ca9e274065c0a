use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;
use crate::values::{InstrumentId, Price, Quantity};

/// Trade printed on the venue. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// The instrument that was traded
    pub instrument_id: InstrumentId,
    pub price: Price,
    pub size: Quantity,
    /// Side of the taker
    pub taker_side: Side,
}

impl Trade {
    pub fn new(
        instrument_id: impl Into<InstrumentId>,
        price: Price,
        size: Quantity,
        taker_side: Side,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            price,
            size,
            taker_side,
        }
    }

    /// Returns the notional value of the trade (price * size)
    pub fn notional(&self) -> Decimal {
        self.price * self.size
    }
}
