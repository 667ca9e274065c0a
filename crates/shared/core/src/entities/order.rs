use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Side;
use crate::error::{ValidationError, ValidationResult};
use crate::values::{InstrumentId, Notional, Price, Quantity};

/// Client-side identifier stamped on every order that passes the risk gate
pub type ClientOrderId = Uuid;

/// Order intent produced by a strategy callback.
///
/// Only limit orders exist: a market order has no price to check limits against.
/// Intents are ephemeral and live for a single dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The instrument the order is for
    pub instrument_id: InstrumentId,
    pub side: Side,
    /// Limit price, must be > 0
    pub price: Price,
    /// Units to trade, must be > 0
    pub volume: Quantity,
}

impl Order {
    pub fn new(
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        price: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            price,
            volume,
        }
    }

    /// Buy `volume` at `price`
    pub fn buy(instrument_id: impl Into<InstrumentId>, price: Price, volume: Quantity) -> Self {
        Self::new(instrument_id, Side::Buy, price, volume)
    }

    /// Sell `volume` at `price`
    pub fn sell(instrument_id: impl Into<InstrumentId>, price: Price, volume: Quantity) -> Self {
        Self::new(instrument_id, Side::Sell, price, volume)
    }

    /// Unsigned notional of the order (price * volume), `None` out of range
    pub fn notional(&self) -> Option<Notional> {
        self.price.checked_mul(self.volume)
    }

    /// Volume signed by side (+ for Buy, - for Sell)
    pub fn signed_volume(&self) -> Decimal {
        self.side.sign() * self.volume
    }

    /// Notional signed by side
    pub fn signed_notional(&self) -> Option<Decimal> {
        self.notional().map(|n| self.side.sign() * n)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.instrument_id.is_empty() {
            return Err(ValidationError::EmptyInstrumentId);
        }
        if self.price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(self.price));
        }
        if self.volume <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveVolume(self.volume));
        }
        Ok(())
    }
}

/// An order intent that passed the risk gate, on its way to the execution link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedOrder {
    pub client_order_id: ClientOrderId,
    /// Name of the strategy that produced the intent
    pub strategy: String,
    pub order: Order,
    pub accepted_at: DateTime<Utc>,
}

impl AcceptedOrder {
    pub fn new(strategy: impl Into<String>, order: Order) -> Self {
        Self {
            client_order_id: Uuid::new_v4(),
            strategy: strategy.into(),
            order,
            accepted_at: Utc::now(),
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.order.instrument_id
    }
}
