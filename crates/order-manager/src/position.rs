//! Position Tracking
//!
//! Net quantity and signed notional per instrument. Positions move only when
//! the risk gate accepts an order intent; fills are not tracked.
//!
//! The tracker is shared between processing units. Each instrument's entry is
//! guarded by its map shard lock, so a check-then-apply done through
//! [`PositionTracker::update`] is atomic for that instrument.

use dashmap::DashMap;
use polybot_core::{InstrumentId, Price, Quantity, Side};
use std::collections::BTreeMap;

pub use polybot_core::{Position, PositionReader};

/// Tracks positions across all instruments
#[derive(Debug, Default)]
pub struct PositionTracker {
    positions: DashMap<InstrumentId, Position>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the position of `instrument_id` and return the new value.
    ///
    /// This is also the compensating call: there is no undo, a correction is
    /// applied as a trade on the opposite side. Returns `None` and leaves the
    /// position as it was when the result would leave the decimal range.
    pub fn apply(
        &self,
        instrument_id: &str,
        side: Side,
        price: Price,
        volume: Quantity,
    ) -> Option<Position> {
        self.update(instrument_id, |position| {
            let next = position.after(side, price, volume)?;
            *position = next;
            Some(next)
        })
    }

    /// Run `f` on the position of `instrument_id` while holding its entry lock.
    ///
    /// The entry is created flat on first reference. `f` must not touch the
    /// tracker again or it will deadlock on the same shard.
    pub fn update<T>(&self, instrument_id: &str, f: impl FnOnce(&mut Position) -> T) -> T {
        let mut entry = self
            .positions
            .entry(instrument_id.to_string())
            .or_default();
        f(entry.value_mut())
    }

    /// Current position, flat if the instrument was never traded
    pub fn position_of(&self, instrument_id: &str) -> Position {
        self.positions
            .get(instrument_id)
            .map(|p| *p.value())
            .unwrap_or_default()
    }

    /// Copy of every position, sorted by instrument
    pub fn snapshot(&self) -> BTreeMap<InstrumentId, Position> {
        self.positions
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Number of instruments with a position entry
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl PositionReader for PositionTracker {
    fn position_of(&self, instrument_id: &str) -> Position {
        PositionTracker::position_of(self, instrument_id)
    }
}
