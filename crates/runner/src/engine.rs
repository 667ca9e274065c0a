//! Trading Engine
//!
//! Owns registration and the run loop:
//!
//! 1. `register_strategy` any number of times
//! 2. `start` freezes the registry, spawns the shards and the order forwarder,
//!    then pumps the information link until it ends
//!
//! Startup misconfiguration fails `start` before a single event is read.

use crate::config::EngineConfig;
use crate::error::{EngineError, RegistrationError, Result};
use crate::registry::{StrategyId, StrategyRegistryBuilder};
use crate::router::{EventRouter, RouterStats};
use crate::shard::{ConsistentHashStrategy, Shard, ShardMap, ShardSet, ShardingStrategy};
use log::{error, info, warn};
use polybot_core::{InstrumentId, InstrumentLimit};
use polybot_order_manager::{LimitEngine, Position, PositionTracker, RiskGate};
use polybot_ports::{ExecutionLink, InformationLink};
use polybot_strategy::Strategy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Summary returned once the information link is exhausted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    /// Events decoded and handed to a shard
    pub events_received: u64,
    /// Malformed or out-of-sequence messages dropped at the feed
    pub feed_errors: u64,
    /// Book inputs the book refused
    pub book_errors: u64,
    /// Events dropped for instruments no strategy listens to
    pub unrouted_dropped: u64,
    pub callbacks: u64,
    pub callback_failures: u64,
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    /// Accepted orders the execution link took
    pub orders_sent: u64,
    /// Accepted orders the execution link refused
    pub execution_failures: u64,
    /// Final position per instrument
    pub positions: BTreeMap<InstrumentId, Position>,
}

impl EngineReport {
    fn absorb(&mut self, stats: &RouterStats) {
        self.book_errors += stats.book_errors;
        self.unrouted_dropped += stats.unrouted_dropped;
        self.callbacks += stats.callbacks;
        self.callback_failures += stats.callback_failures;
        self.orders_accepted += stats.orders_accepted;
        self.orders_rejected += stats.orders_rejected;
    }
}

pub struct TradingEngine {
    config: EngineConfig,
    /// `None` once started
    registrations: Option<StrategyRegistryBuilder>,
    sharding_strategy: Arc<dyn ShardingStrategy>,
}

impl TradingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_sharding_strategy(config, Arc::new(ConsistentHashStrategy))
    }

    pub fn with_sharding_strategy(
        config: EngineConfig,
        sharding_strategy: Arc<dyn ShardingStrategy>,
    ) -> Self {
        Self {
            config,
            registrations: Some(StrategyRegistryBuilder::new()),
            sharding_strategy,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a strategy for a set of instruments. Closed once started.
    pub fn register_strategy<S, I, L>(
        &mut self,
        strategy: S,
        instrument_ids: I,
        limits: L,
    ) -> std::result::Result<StrategyId, RegistrationError>
    where
        S: Strategy + 'static,
        I: IntoIterator,
        I::Item: Into<InstrumentId>,
        L: IntoIterator<Item = InstrumentLimit>,
    {
        self.registrations
            .as_mut()
            .ok_or(RegistrationError::AlreadyStarted)?
            .register_strategy(strategy, instrument_ids, limits)
    }

    /// Limits registered so far, `None` once started
    pub fn limits(&self) -> Option<&LimitEngine> {
        self.registrations.as_ref().map(|r| r.limits())
    }

    pub fn is_started(&self) -> bool {
        self.registrations.is_none()
    }

    /// Consume `information` until it ends, forwarding accepted orders to `execution`.
    pub async fn start<I, E>(&mut self, mut information: I, execution: E) -> Result<EngineReport>
    where
        I: InformationLink,
        E: ExecutionLink + 'static,
    {
        self.config.validate()?;
        let registrations = self
            .registrations
            .take()
            .ok_or(RegistrationError::AlreadyStarted)?;
        let (registry, limits) = registrations.build()?;

        let registry = Arc::new(registry);
        let positions = Arc::new(PositionTracker::new());
        let gate = Arc::new(RiskGate::new(Arc::new(limits), Arc::clone(&positions)));

        info!(
            "[engine] Starting with {} strategies over {} shard(s), feed={}, execution={}",
            registry.len(),
            self.config.shard_count,
            information.name(),
            execution.name()
        );

        let (orders_tx, orders_rx) = mpsc::channel(self.config.channel_capacity);
        let forwarder = tokio::spawn(forward_orders(orders_rx, execution));

        let mut handles = Vec::with_capacity(self.config.shard_count);
        let mut tasks = Vec::with_capacity(self.config.shard_count);
        for shard_id in 0..self.config.shard_count {
            let router = EventRouter::new(
                Arc::clone(&registry),
                Arc::clone(&gate),
                self.config.unrouted_market_data,
            );
            let (handle, task) = Shard::spawn(
                shard_id,
                router,
                self.config.channel_capacity,
                orders_tx.clone(),
            );
            handles.push(handle);
            tasks.push(task);
        }
        drop(orders_tx);
        let map = ShardMap::new(
            &registry,
            self.config.shard_count,
            Arc::clone(&self.sharding_strategy),
        );
        let shards = ShardSet::new(handles, map);

        let mut report = EngineReport::default();
        while let Some(message) = information.next_message().await {
            match message {
                Ok(event) => {
                    report.events_received += 1;
                    if let Err(e) = shards.route(event).await {
                        error!("[engine] {}", e);
                        break;
                    }
                }
                Err(e) => {
                    report.feed_errors += 1;
                    warn!("[engine] Dropped feed message: {}", e);
                }
            }
        }
        info!("[engine] Information link ended, draining shards");

        // Closing the inboxes lets every shard drain and stop
        drop(shards);
        for task in tasks {
            let stats = task
                .await
                .map_err(|e| EngineError::TaskFailed(e.to_string()))?;
            report.absorb(&stats);
        }

        let (sent, failed) = forwarder
            .await
            .map_err(|e| EngineError::TaskFailed(e.to_string()))?;
        report.orders_sent = sent;
        report.execution_failures = failed;
        report.positions = positions.snapshot();

        info!(
            "[engine] Stopped: {} events, {} accepted, {} rejected, {} sent",
            report.events_received, report.orders_accepted, report.orders_rejected, report.orders_sent
        );
        Ok(report)
    }
}

/// Hand accepted orders to the execution link until every shard is done
async fn forward_orders<E: ExecutionLink>(
    mut orders: mpsc::Receiver<polybot_core::AcceptedOrder>,
    execution: E,
) -> (u64, u64) {
    let mut sent = 0;
    let mut failed = 0;
    while let Some(order) = orders.recv().await {
        let client_order_id = order.client_order_id;
        match execution.send_order(order).await {
            Ok(()) => sent += 1,
            Err(e) => {
                failed += 1;
                error!(
                    "[engine] Execution link refused order {}: {}",
                    client_order_id, e
                );
            }
        }
    }
    (sent, failed)
}
