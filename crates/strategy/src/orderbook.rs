//! Order Book Replica
//!
//! Each instrument's book is owned by the processing unit that handles that
//! instrument and handed to strategies as `&OrderBook`. No locks are needed
//! when reading it.

use crate::error::{BookError, BookResult};
use polybot_core::{BookLevel, InstrumentId, Price, Quantity, Side, SnapshotLevel};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Top N levels per side, price-sorted (bids descending, asks ascending)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDepth {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

/// Order book replica for a single instrument
///
/// Uses BTreeMap for price levels to maintain sorted order.
/// Bids are read in descending order (highest first).
/// Asks are read in ascending order (lowest first).
///
/// A crossed book (best bid >= best ask) is a surfaced state, not an error.
/// After [`OrderBook::reset`] the book drops deltas until a snapshot arrives.
#[derive(Debug, Clone)]
pub struct OrderBook {
    instrument_id: InstrumentId,
    /// Bid levels: price -> size
    bids: BTreeMap<Price, Quantity>,
    /// Ask levels: price -> size
    asks: BTreeMap<Price, Quantity>,
    crossed: bool,
    awaiting_snapshot: bool,
    /// Number of mutations applied (deltas, snapshots, resets)
    updates: u64,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(instrument_id: impl Into<InstrumentId>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            crossed: false,
            awaiting_snapshot: false,
            updates: 0,
        }
    }

    // === Mutations ===

    /// Upsert (size > 0) or remove (size == 0) a single level
    pub fn apply_delta(&mut self, side: Side, price: Price, size: Quantity) -> BookResult<()> {
        if self.awaiting_snapshot {
            return Err(BookError::AwaitingSnapshot(self.instrument_id.clone()));
        }
        BookLevel::new(price, size).validate()?;

        let levels = self.side_mut(side);
        if size.is_zero() {
            levels.remove(&price);
        } else {
            levels.insert(price, size);
        }
        self.after_mutation();
        Ok(())
    }

    /// Replace both sides of the book atomically
    ///
    /// Every level is validated before the book is touched; an invalid level
    /// rejects the whole snapshot. Zero-size levels are skipped and a repeated
    /// price keeps the last size given for it.
    pub fn apply_snapshot(&mut self, levels: &[SnapshotLevel]) -> BookResult<()> {
        for level in levels {
            level.level().validate()?;
        }

        let mut bids = BTreeMap::new();
        let mut asks = BTreeMap::new();
        for level in levels.iter().filter(|l| !l.size.is_zero()) {
            match level.side {
                Side::Buy => bids.insert(level.price, level.size),
                Side::Sell => asks.insert(level.price, level.size),
            };
        }

        self.bids = bids;
        self.asks = asks;
        self.awaiting_snapshot = false;
        self.after_mutation();
        Ok(())
    }

    /// Discard all accumulated state; the next accepted input must be a snapshot
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.awaiting_snapshot = true;
        self.after_mutation();
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, Quantity> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn after_mutation(&mut self) {
        self.crossed = match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        };
        self.updates += 1;
    }

    // === State ===

    /// Get the instrument ID
    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    /// Best bid >= best ask with both sides present
    pub fn is_crossed(&self) -> bool {
        self.crossed
    }

    /// True after a reset until the next snapshot
    pub fn is_awaiting_snapshot(&self) -> bool {
        self.awaiting_snapshot
    }

    /// Number of mutations applied so far
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Check if book is empty
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Check if book has both sides
    pub fn is_two_sided(&self) -> bool {
        !self.bids.is_empty() && !self.asks.is_empty()
    }

    // === Price Queries ===

    /// Highest bid, `None` when the bid side is empty
    pub fn best_bid(&self) -> Option<BookLevel> {
        self.bids
            .iter()
            .next_back()
            .map(|(p, s)| BookLevel::new(*p, *s))
    }

    /// Lowest ask, `None` when the ask side is empty
    pub fn best_ask(&self) -> Option<BookLevel> {
        self.asks.iter().next().map(|(p, s)| BookLevel::new(*p, *s))
    }

    /// Top `n` levels per side
    pub fn depth(&self, n: usize) -> BookDepth {
        BookDepth {
            bids: self.levels(Side::Buy).take(n).collect(),
            asks: self.levels(Side::Sell).take(n).collect(),
        }
    }

    /// Size resting at an exact price, zero if no level
    pub fn size_at(&self, side: Side, price: Price) -> Quantity {
        let levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        levels.get(&price).copied().unwrap_or(Decimal::ZERO)
    }

    /// Levels of one side from the top of book outwards
    pub fn levels(&self, side: Side) -> Box<dyn Iterator<Item = BookLevel> + '_> {
        match side {
            Side::Buy => Box::new(
                self.bids
                    .iter()
                    .rev()
                    .map(|(p, s)| BookLevel::new(*p, *s)),
            ),
            Side::Sell => Box::new(self.asks.iter().map(|(p, s)| BookLevel::new(*p, *s))),
        }
    }

    /// Ask minus bid, `None` unless both sides are present.
    /// Negative or zero when the book is crossed.
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }

    /// Average of best bid and best ask
    pub fn midpoint(&self) -> Option<Decimal> {
        Some((self.best_bid()?.price + self.best_ask()?.price) / Decimal::TWO)
    }

    /// Spread in basis points of the midpoint
    pub fn spread_bps(&self) -> Option<Decimal> {
        match (self.spread(), self.midpoint()) {
            (Some(spread), Some(mid)) if !mid.is_zero() => {
                Some(spread / mid * Decimal::from(10_000))
            }
            _ => None,
        }
    }

    // === Liquidity Analytics ===

    /// Total size over the first `levels` levels of each side (0 = all levels)
    pub fn total_volume(&self, levels: usize) -> (Quantity, Quantity) {
        let n = if levels == 0 { usize::MAX } else { levels };
        let bid: Quantity = self.levels(Side::Buy).take(n).map(|l| l.size).sum();
        let ask: Quantity = self.levels(Side::Sell).take(n).map(|l| l.size).sum();
        (bid, ask)
    }

    /// Volume-weighted price across the first `levels` levels of both sides
    /// (0 = all levels). `None` on an empty book.
    pub fn vwap(&self, levels: usize) -> Option<Decimal> {
        let n = if levels == 0 { usize::MAX } else { levels };
        let (volume, weighted) = self
            .levels(Side::Buy)
            .take(n)
            .chain(self.levels(Side::Sell).take(n))
            .fold((Decimal::ZERO, Decimal::ZERO), |(v, w), l| {
                (v + l.size, w + l.notional())
            });

        if volume.is_zero() {
            None
        } else {
            Some(weighted / volume)
        }
    }

    /// Cumulative size on `side` at prices at least as good as `price`
    /// (bids at or above it, asks at or below it)
    pub fn volume_through(&self, price: Price, side: Side) -> Quantity {
        match side {
            Side::Buy => self.bids.range(price..).map(|(_, s)| *s).sum(),
            Side::Sell => self.asks.range(..=price).map(|(_, s)| *s).sum(),
        }
    }

    /// Average execution price for taking `volume` on `side`
    ///
    /// A buy walks the asks, a sell walks the bids. `None` if the opposite
    /// side cannot absorb the volume or the volume is not positive.
    pub fn impact_price(&self, volume: Quantity, side: Side) -> Option<Decimal> {
        if volume <= Decimal::ZERO {
            return None;
        }

        let mut remaining = volume;
        let mut weighted = Decimal::ZERO;
        for level in self.levels(side.opposite()) {
            if remaining.is_zero() {
                break;
            }
            let taken = remaining.min(level.size);
            weighted += taken * level.price;
            remaining -= taken;
        }

        if remaining.is_zero() {
            Some(weighted / volume)
        } else {
            None // Not enough liquidity
        }
    }

    /// Distance of the impact price from the midpoint, in basis points
    pub fn slippage_bps(&self, volume: Quantity, side: Side) -> Option<Decimal> {
        let mid = self.midpoint()?;
        let impact = self.impact_price(volume, side)?;
        if mid.is_zero() {
            return None;
        }
        Some((impact - mid).abs() / mid * Decimal::from(10_000))
    }

    /// (bid - ask) / (bid + ask) over the first `levels` levels.
    /// Between -1 (all asks) and +1 (all bids), zero on an empty book.
    pub fn imbalance(&self, levels: usize) -> Decimal {
        let (bid, ask) = self.total_volume(levels);
        let total = bid + ask;
        if total.is_zero() {
            Decimal::ZERO
        } else {
            (bid - ask) / total
        }
    }
}

impl std::fmt::Display for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bid = self.best_bid().map(|l| l.price.to_string());
        let ask = self.best_ask().map(|l| l.price.to_string());
        write!(
            f,
            "OrderBook({} bid={} ask={}{})",
            self.instrument_id,
            bid.as_deref().unwrap_or("-"),
            ask.as_deref().unwrap_or("-"),
            if self.crossed { " CROSSED" } else { "" }
        )
    }
}
