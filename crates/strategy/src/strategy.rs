//! Strategy Trait
//!
//! Strategies are plain synchronous objects. The router owns the books and
//! hands them to each callback read-only, together with a [`StrategyContext`]
//! for positions and the strategy's other instruments. The orders a callback
//! returns are intents that still have to pass the risk gate.

use crate::context::StrategyContext;
use crate::error::StrategyError;
use crate::orderbook::OrderBook;
use polybot_core::{Order, Trade};

/// What a callback hands back to the router
pub type StrategyResult = Result<Vec<Order>, StrategyError>;

/// Strategy trait - implement this for your trading strategy
///
/// Callbacks must return promptly and must not block on I/O: a slow callback
/// stalls every instrument processed by the same unit. Both callbacks default
/// to producing no orders.
pub trait Strategy: Send {
    /// Strategy name for logging; must be unique within an engine
    fn name(&self) -> &str;

    /// Called when a trade prints on a registered instrument
    fn on_trade(
        &mut self,
        _instrument_id: &str,
        _trade: &Trade,
        _book: &OrderBook,
        _ctx: &StrategyContext<'_>,
    ) -> StrategyResult {
        Ok(Vec::new())
    }

    /// Called after a delta, snapshot or reset changed the book
    fn on_order_book_change(
        &mut self,
        _instrument_id: &str,
        _book: &OrderBook,
        _ctx: &StrategyContext<'_>,
    ) -> StrategyResult {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polybot_core::{Position, PositionReader, Side, SnapshotLevel};
    use rust_decimal_macros::dec;
    use std::collections::{BTreeSet, HashMap};

    struct Flat;

    impl PositionReader for Flat {
        fn position_of(&self, _instrument_id: &str) -> Position {
            Position::default()
        }
    }

    /// Joins the best bid on every book change while flat
    struct JoinBid;

    impl Strategy for JoinBid {
        fn name(&self) -> &str {
            "join-bid"
        }

        fn on_order_book_change(
            &mut self,
            instrument_id: &str,
            book: &OrderBook,
            ctx: &StrategyContext<'_>,
        ) -> StrategyResult {
            if !ctx.position_of(instrument_id).is_flat() {
                return Ok(Vec::new());
            }
            let bid = book
                .best_bid()
                .ok_or_else(|| StrategyError::MissingState(instrument_id.to_string()))?;
            Ok(vec![Order::buy(instrument_id, bid.price, dec!(1))])
        }
    }

    // Ensure trait is object-safe
    fn _assert_object_safe(_: &dyn Strategy) {}

    #[test]
    fn test_default_callbacks_return_nothing() {
        let books = HashMap::new();
        let instruments = BTreeSet::new();
        let ctx = StrategyContext::new(&Flat, &books, &instruments);

        let mut strategy = JoinBid;
        let book = OrderBook::new("0x1");
        let trade = Trade::new("0x1", dec!(0.5), dec!(1), Side::Buy);
        assert_eq!(strategy.on_trade("0x1", &trade, &book, &ctx), Ok(Vec::new()));
    }

    #[test]
    fn test_callback_reads_book() {
        let books = HashMap::new();
        let instruments = BTreeSet::new();
        let ctx = StrategyContext::new(&Flat, &books, &instruments);

        let mut strategy: Box<dyn Strategy> = Box::new(JoinBid);
        let mut book = OrderBook::new("0x1");
        assert!(matches!(
            strategy.on_order_book_change("0x1", &book, &ctx),
            Err(StrategyError::MissingState(_))
        ));

        book.apply_snapshot(&[SnapshotLevel::bid(dec!(0.41), dec!(10))])
            .unwrap();
        let orders = strategy.on_order_book_change("0x1", &book, &ctx).unwrap();
        assert_eq!(orders, vec![Order::buy("0x1", dec!(0.41), dec!(1))]);
    }
}
