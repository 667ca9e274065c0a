//! Polybot Runner - Tick-to-Trade Engine
//!
//! Wires the pipeline together:
//!
//! - **Registry**: Which strategies listen to which instruments, and their limits
//! - **Router**: Book update, ordered callbacks, sequential risk checks
//! - **Shards**: One run-to-completion task per group of instruments; instruments
//!   sharing a strategy share a shard
//! - **Engine**: Registration surface and the feed/execution run loop
//!
//! ## Architecture
//!
//! ```text
//!   InformationLink
//!         │ MarketEvent
//!         ▼
//!   ┌────────────┐   hash(instrument)   ┌─────────────────────────────┐
//!   │   Engine   │ ───────────────────► │ Shard N: EventRouter        │
//!   └────────────┘                      │   OrderBook per instrument  │
//!                                       │   Strategy callbacks        │
//!                                       │   RiskGate (shared)         │
//!                                       └──────────────┬──────────────┘
//!                                                      │ AcceptedOrder
//!                                                      ▼
//!                                               order forwarder
//!                                                      │
//!                                                      ▼
//!                                               ExecutionLink
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut engine = TradingEngine::new(EngineConfig::default());
//! engine.register_strategy(
//!     MyStrategy::default(),
//!     ["0xabc"],
//!     [InstrumentLimit::symmetric("0xabc", dec!(100), dec!(50))],
//! )?;
//!
//! let (feed, information) = ChannelInformationLink::pair(1024);
//! let (execution, orders) = ChannelExecutionLink::pair(1024);
//! let report = engine.start(information, execution).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod router;
pub mod shard;

// Re-export main types
pub use config::{EngineConfig, UnroutedPolicy};
pub use engine::{EngineReport, TradingEngine};
pub use error::{ConfigError, EngineError, RegistrationError, Result};
pub use registry::{
    RegisteredStrategy, SharedStrategy, StrategyId, StrategyRegistry, StrategyRegistryBuilder,
};
pub use router::{DispatchOutcome, EventRouter, RejectedOrder, RouterStats};
pub use shard::{
    ConsistentHashStrategy, Shard, ShardHandle, ShardMap, ShardSet, ShardingStrategy,
};
