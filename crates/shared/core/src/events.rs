//! Inbound market events
//!
//! The information link hands the pipeline an ordered, deduplicated stream
//! of these events. `Reset` tells the pipeline that incremental state for an
//! instrument is stale and a fresh snapshot follows.

use serde::{Deserialize, Serialize};

use crate::entities::{BookLevel, Side, Trade};
use crate::values::{InstrumentId, Price, Quantity};

/// One level of a book snapshot, tagged with the side it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLevel {
    pub side: Side,
    pub price: Price,
    pub size: Quantity,
}

impl SnapshotLevel {
    pub fn bid(price: Price, size: Quantity) -> Self {
        Self {
            side: Side::Buy,
            price,
            size,
        }
    }

    pub fn ask(price: Price, size: Quantity) -> Self {
        Self {
            side: Side::Sell,
            price,
            size,
        }
    }

    pub fn level(&self) -> BookLevel {
        BookLevel::new(self.price, self.size)
    }
}

/// Normalized market data event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A trade printed on the venue
    Trade {
        instrument_id: InstrumentId,
        price: Price,
        volume: Quantity,
        /// Side of the taker
        side: Side,
    },
    /// Incremental level change (size 0 removes the level)
    BookDelta {
        instrument_id: InstrumentId,
        side: Side,
        price: Price,
        size: Quantity,
    },
    /// Full replacement of both sides of the book
    BookSnapshot {
        instrument_id: InstrumentId,
        levels: Vec<SnapshotLevel>,
    },
    /// Discard incremental state; the next book input must be a snapshot
    Reset { instrument_id: InstrumentId },
}

impl MarketEvent {
    /// Get the instrument this event relates to
    pub fn instrument_id(&self) -> &str {
        match self {
            MarketEvent::Trade { instrument_id, .. } => instrument_id,
            MarketEvent::BookDelta { instrument_id, .. } => instrument_id,
            MarketEvent::BookSnapshot { instrument_id, .. } => instrument_id,
            MarketEvent::Reset { instrument_id } => instrument_id,
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            MarketEvent::Trade { .. } => "trade",
            MarketEvent::BookDelta { .. } => "book_delta",
            MarketEvent::BookSnapshot { .. } => "book_snapshot",
            MarketEvent::Reset { .. } => "reset",
        }
    }

    /// Create a trade event
    pub fn trade(
        instrument_id: impl Into<InstrumentId>,
        price: Price,
        volume: Quantity,
        side: Side,
    ) -> Self {
        MarketEvent::Trade {
            instrument_id: instrument_id.into(),
            price,
            volume,
            side,
        }
    }

    /// Create a book delta event
    pub fn delta(
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        price: Price,
        size: Quantity,
    ) -> Self {
        MarketEvent::BookDelta {
            instrument_id: instrument_id.into(),
            side,
            price,
            size,
        }
    }

    /// Create a snapshot event
    pub fn snapshot(instrument_id: impl Into<InstrumentId>, levels: Vec<SnapshotLevel>) -> Self {
        MarketEvent::BookSnapshot {
            instrument_id: instrument_id.into(),
            levels,
        }
    }

    /// Create a reset event
    pub fn reset(instrument_id: impl Into<InstrumentId>) -> Self {
        MarketEvent::Reset {
            instrument_id: instrument_id.into(),
        }
    }

    /// The trade carried by this event, if it is one
    pub fn as_trade(&self) -> Option<Trade> {
        match self {
            MarketEvent::Trade {
                instrument_id,
                price,
                volume,
                side,
            } => Some(Trade::new(instrument_id.clone(), *price, *volume, *side)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_instrument_id_for_every_variant() {
        let events = vec![
            MarketEvent::trade("0x1", dec!(0.5), dec!(10), Side::Buy),
            MarketEvent::delta("0x1", Side::Sell, dec!(0.6), dec!(5)),
            MarketEvent::snapshot("0x1", vec![SnapshotLevel::bid(dec!(0.4), dec!(1))]),
            MarketEvent::reset("0x1"),
        ];
        for event in events {
            assert_eq!(event.instrument_id(), "0x1");
        }
    }

    #[test]
    fn test_as_trade() {
        let event = MarketEvent::trade("0x1", dec!(0.5), dec!(10), Side::Sell);
        let trade = event.as_trade().unwrap();
        assert_eq!(trade.price, dec!(0.5));
        assert_eq!(trade.taker_side, Side::Sell);
        assert!(MarketEvent::reset("0x1").as_trade().is_none());
    }

    #[test]
    fn test_tagged_json_decoding() {
        let json = r#"{"type":"book_delta","instrument_id":"0x1","side":"buy","price":"0.45","size":"12"}"#;
        let event: MarketEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            MarketEvent::delta("0x1", Side::Buy, dec!(0.45), dec!(12))
        );

        let json = r#"{"type":"reset","instrument_id":"0x1"}"#;
        let event: MarketEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind(), "reset");
    }
}
