//! Strategy Context
//!
//! Read-only view handed to every callback next to the event's own book:
//! current positions and the books of every instrument the strategy is
//! registered on.

use crate::orderbook::OrderBook;
use polybot_core::{InstrumentId, Position, PositionReader};
use std::collections::{BTreeSet, HashMap};

pub struct StrategyContext<'a> {
    positions: &'a dyn PositionReader,
    books: &'a HashMap<InstrumentId, OrderBook>,
    instruments: &'a BTreeSet<InstrumentId>,
}

impl<'a> StrategyContext<'a> {
    /// `books` may hold more instruments than `instruments`; only the
    /// registered ones are visible.
    pub fn new(
        positions: &'a dyn PositionReader,
        books: &'a HashMap<InstrumentId, OrderBook>,
        instruments: &'a BTreeSet<InstrumentId>,
    ) -> Self {
        Self {
            positions,
            books,
            instruments,
        }
    }

    /// Current position, flat if never traded
    pub fn position_of(&self, instrument_id: &str) -> Position {
        self.positions.position_of(instrument_id)
    }

    /// Book of a registered instrument, `None` before its first event
    pub fn book(&self, instrument_id: &str) -> Option<&'a OrderBook> {
        if !self.instruments.contains(instrument_id) {
            return None;
        }
        self.books.get(instrument_id)
    }

    /// Every registered book that has seen an event, by instrument id
    pub fn books(&self) -> impl Iterator<Item = &'a OrderBook> {
        let books = self.books;
        self.instruments
            .iter()
            .filter_map(move |id| books.get(id.as_str()))
    }

    /// Instruments the strategy is registered on
    pub fn instruments(&self) -> &'a BTreeSet<InstrumentId> {
        self.instruments
    }
}

impl std::fmt::Debug for StrategyContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyContext")
            .field("instruments", &self.instruments)
            .field("books", &self.books().count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polybot_core::SnapshotLevel;
    use rust_decimal_macros::dec;

    struct FixedPositions(HashMap<String, Position>);

    impl PositionReader for FixedPositions {
        fn position_of(&self, instrument_id: &str) -> Position {
            self.0.get(instrument_id).copied().unwrap_or_default()
        }
    }

    fn book(id: &str, bid: rust_decimal::Decimal) -> OrderBook {
        let mut book = OrderBook::new(id);
        book.apply_snapshot(&[SnapshotLevel::bid(bid, dec!(1))]).unwrap();
        book
    }

    #[test]
    fn test_only_registered_books_are_visible() {
        let positions = FixedPositions(HashMap::new());
        let books: HashMap<_, _> = [
            ("0x1".to_string(), book("0x1", dec!(0.40))),
            ("0x2".to_string(), book("0x2", dec!(0.50))),
            ("0x9".to_string(), book("0x9", dec!(0.90))),
        ]
        .into_iter()
        .collect();
        let instruments: BTreeSet<_> = ["0x1", "0x2", "0x3"].map(String::from).into();

        let ctx = StrategyContext::new(&positions, &books, &instruments);
        let bid = ctx.book("0x2").and_then(|b| b.best_bid()).map(|l| l.price);
        assert_eq!(bid, Some(dec!(0.50)));
        assert!(ctx.book("0x9").is_none());
        // Registered but no event yet
        assert!(ctx.book("0x3").is_none());

        let seen: Vec<_> = ctx.books().map(|b| b.instrument_id().to_string()).collect();
        assert_eq!(seen, vec!["0x1".to_string(), "0x2".to_string()]);
    }

    #[test]
    fn test_positions_read_through() {
        let positions = FixedPositions(
            [("0x1".to_string(), Position::new(dec!(3), dec!(1.2)))]
                .into_iter()
                .collect(),
        );
        let books = HashMap::new();
        let instruments = BTreeSet::new();

        let ctx = StrategyContext::new(&positions, &books, &instruments);
        assert_eq!(ctx.position_of("0x1").quantity, dec!(3));
        assert!(ctx.position_of("0x2").is_flat());
    }
}
