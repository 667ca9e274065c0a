//! Polybot Order Manager
//!
//! The Order Manager sits between strategies and the execution link:
//! - **Position Tracking**: Net quantity and notional per instrument
//! - **Limits**: Inclusive per-instrument position and notional bounds
//! - **Risk Gate**: Atomic check-then-apply for every order intent
//!
//! ## Architecture
//!
//! ```text
//! Strategies ──► Order intents ──► ┌──────────────────────────────┐
//!                                  │          RiskGate            │
//!                                  │  LimitEngine::check          │
//!                                  │        │ Accept              │
//!                                  │        ▼                     │
//!                                  │  PositionTracker (per entry) │
//!                                  └──────────────┬───────────────┘
//!                                                 │ accepted
//!                                                 ▼
//!                                          ExecutionLink
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use polybot_order_manager::{LimitEngine, PositionTracker, RiskGate};
//!
//! let mut limits = LimitEngine::new();
//! limits.set_limit(InstrumentLimit::symmetric("0xabc", dec!(100), dec!(50)))?;
//!
//! let gate = RiskGate::new(Arc::new(limits), Arc::new(PositionTracker::new()));
//! if gate.submit(&Order::buy("0xabc", dec!(0.45), dec!(10))).is_accept() {
//!     // forward to the execution link
//! }
//! ```

pub mod error;
pub mod limits;
pub mod position;
pub mod risk;

// Re-export main types
pub use error::{Error, Result};
pub use limits::{LimitBound, LimitDecision, LimitEngine, LimitViolation, RejectReason};
pub use position::{Position, PositionReader, PositionTracker};
pub use risk::{RiskGate, RiskStats};
