//! Polybot Strategy Framework
//!
//! Provides the pieces a strategy sees:
//! - Per-instrument order book replicas with liquidity analytics
//! - A read-only [`StrategyContext`] with positions and registered books
//! - The synchronous [`Strategy`] capability trait
//!
//! ## Architecture
//!
//! ```text
//! InformationLink ─► MarketEvent ─► OrderBook (owned by the shard)
//!                                        │ &OrderBook, &StrategyContext
//!                                        ▼
//!                                  ┌──────────┐
//!                                  │ Strategy │
//!                                  └────┬─────┘
//!                                       │ Vec<Order>
//!                                       ▼
//!                                   RiskGate ─► ExecutionLink
//! ```

pub mod context;
pub mod error;
pub mod orderbook;
pub mod strategy;

// Re-export main types
pub use context::StrategyContext;
pub use error::{BookError, BookResult, StrategyError};
pub use orderbook::{BookDepth, OrderBook};
pub use strategy::{Strategy, StrategyResult};
