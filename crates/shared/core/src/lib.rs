//! Polybot Core Domain
//!
//! Pure domain types for the Polybot tick-to-trade pipeline.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod events;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    AcceptedOrder, BookLevel, ClientOrderId, InstrumentLimit, Order, Position, PositionReader, Side,
    Trade,
};
pub use error::{ValidationError, ValidationResult};
pub use events::{MarketEvent, SnapshotLevel};
pub use values::{InstrumentId, Notional, Price, Quantity, Timestamp};
