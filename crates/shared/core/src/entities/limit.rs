use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::values::{InstrumentId, Notional, Quantity};

/// Position and notional bounds for one instrument.
///
/// Position limits cap the units held on the bid (long) or ask (short) side.
/// Nominal limits cap the value (price * volume) held on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentLimit {
    pub instrument_id: InstrumentId,
    pub max_position_bid: Quantity,
    pub max_position_ask: Quantity,
    pub max_nominal_position_bid: Notional,
    pub max_nominal_position_ask: Notional,
}

impl InstrumentLimit {
    pub fn new(
        instrument_id: impl Into<InstrumentId>,
        max_position_bid: Quantity,
        max_position_ask: Quantity,
        max_nominal_position_bid: Notional,
        max_nominal_position_ask: Notional,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            max_position_bid,
            max_position_ask,
            max_nominal_position_bid,
            max_nominal_position_ask,
        }
    }

    /// Same bounds on both sides
    pub fn symmetric(
        instrument_id: impl Into<InstrumentId>,
        max_position: Quantity,
        max_nominal_position: Notional,
    ) -> Self {
        Self::new(
            instrument_id,
            max_position,
            max_position,
            max_nominal_position,
            max_nominal_position,
        )
    }

    /// All bounds must be non-negative and the instrument id non-empty
    pub fn validate(&self) -> ValidationResult<()> {
        if self.instrument_id.is_empty() {
            return Err(ValidationError::EmptyInstrumentId);
        }
        let bounds = [
            ("max_position_bid", self.max_position_bid),
            ("max_position_ask", self.max_position_ask),
            ("max_nominal_position_bid", self.max_nominal_position_bid),
            ("max_nominal_position_ask", self.max_nominal_position_ask),
        ];
        for (field, value) in bounds {
            if value < Decimal::ZERO {
                return Err(ValidationError::NegativeLimit {
                    instrument_id: self.instrument_id.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}
