//! Per-instrument processing units
//!
//! Instruments are spread over shards with consistent hashing, so every event
//! for one instrument lands on the same shard and is processed in arrival
//! order. Each shard is a single task running its [`EventRouter`] to
//! completion for one event before taking the next.
//!
//! Instruments linked through a shared strategy are pinned to one shard: the
//! strategy's callbacks then never run on two tasks at once and its context
//! sees every book it is registered on.

use crate::error::EngineError;
use crate::registry::StrategyRegistry;
use crate::router::{EventRouter, RouterStats};
use log::{debug, info, warn};
use polybot_core::{AcceptedOrder, InstrumentId, MarketEvent};
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Strategy for distributing instruments across shards
pub trait ShardingStrategy: Send + Sync {
    /// Get the shard index for an instrument
    fn shard_index(&self, instrument_id: &str, num_shards: usize) -> usize;
}

/// Default sharding strategy using consistent hashing
pub struct ConsistentHashStrategy;

impl ShardingStrategy for ConsistentHashStrategy {
    fn shard_index(&self, instrument_id: &str, num_shards: usize) -> usize {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        instrument_id.hash(&mut hasher);
        (hasher.finish() as usize) % num_shards.max(1)
    }
}

/// Maps instruments to shard indices
///
/// Instruments are grouped by the strategies registered on them (two
/// instruments are in one group when some chain of strategies links them).
/// A group goes to the shard its smallest instrument id hashes to. Instruments
/// no strategy listens to are hashed on their own.
pub struct ShardMap {
    num_shards: usize,
    pinned: HashMap<InstrumentId, usize>,
    sharding_strategy: Arc<dyn ShardingStrategy>,
}

impl ShardMap {
    pub fn new(
        registry: &StrategyRegistry,
        num_shards: usize,
        sharding_strategy: Arc<dyn ShardingStrategy>,
    ) -> Self {
        let mut pinned = HashMap::new();
        for group in strategy_groups(registry) {
            let Some(anchor) = group.first() else {
                continue;
            };
            let shard = sharding_strategy.shard_index(anchor, num_shards);
            debug!(
                "[shards] {} instrument(s) anchored on {} -> shard {}",
                group.len(),
                anchor,
                shard
            );
            for instrument_id in group {
                pinned.insert(instrument_id, shard);
            }
        }
        Self {
            num_shards,
            pinned,
            sharding_strategy,
        }
    }

    pub fn shard_index(&self, instrument_id: &str) -> usize {
        match self.pinned.get(instrument_id) {
            Some(&shard) => shard,
            None => self
                .sharding_strategy
                .shard_index(instrument_id, self.num_shards),
        }
    }
}

/// Connected groups of instruments, linked by shared strategies
fn strategy_groups(registry: &StrategyRegistry) -> Vec<BTreeSet<InstrumentId>> {
    let mut groups: Vec<BTreeSet<InstrumentId>> = Vec::new();
    for strategy in registry.strategies() {
        let mut merged = strategy.instruments.clone();
        groups.retain(|group| {
            if group.is_disjoint(&merged) {
                true
            } else {
                merged.extend(group.iter().cloned());
                false
            }
        });
        groups.push(merged);
    }
    groups
}

/// Handle to communicate with a shard
#[derive(Clone)]
pub struct ShardHandle {
    pub shard_id: usize,
    sender: mpsc::Sender<MarketEvent>,
    events_processed: Arc<AtomicU64>,
}

impl ShardHandle {
    /// Queue an event, waiting if the inbox is full
    pub async fn send(&self, event: MarketEvent) -> Result<(), EngineError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| EngineError::ShardShutdown(self.shard_id))
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed.load(Ordering::Relaxed)
    }
}

/// A shard that owns the books of its instruments
pub struct Shard {
    shard_id: usize,
    router: EventRouter,
    receiver: mpsc::Receiver<MarketEvent>,
    orders: mpsc::Sender<AcceptedOrder>,
    events_processed: Arc<AtomicU64>,
}

impl Shard {
    /// Start the shard task and return its handle
    ///
    /// The task ends once every [`ShardHandle`] is dropped and the inbox is
    /// drained; it yields the router's counters.
    pub fn spawn(
        shard_id: usize,
        router: EventRouter,
        capacity: usize,
        orders: mpsc::Sender<AcceptedOrder>,
    ) -> (ShardHandle, JoinHandle<RouterStats>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let events_processed = Arc::new(AtomicU64::new(0));

        let handle = ShardHandle {
            shard_id,
            sender,
            events_processed: Arc::clone(&events_processed),
        };

        let shard = Shard {
            shard_id,
            router,
            receiver,
            orders,
            events_processed,
        };

        (handle, tokio::spawn(shard.run()))
    }

    /// Main event loop - processes events sequentially
    async fn run(mut self) -> RouterStats {
        info!("[shard-{}] Started", self.shard_id);

        while let Some(event) = self.receiver.recv().await {
            let outcome = self.router.dispatch(event);
            self.events_processed.fetch_add(1, Ordering::Relaxed);

            for order in outcome.accepted {
                if self.orders.send(order).await.is_err() {
                    warn!(
                        "[shard-{}] Order queue closed, accepted order discarded",
                        self.shard_id
                    );
                }
            }
        }

        let stats = self.router.stats();
        info!(
            "[shard-{}] Stopped after {} events ({} accepted, {} rejected)",
            self.shard_id, stats.events, stats.orders_accepted, stats.orders_rejected
        );
        stats
    }
}

/// The set of running shards and the rule mapping instruments to them
pub struct ShardSet {
    shards: Vec<ShardHandle>,
    map: ShardMap,
}

impl ShardSet {
    pub fn new(shards: Vec<ShardHandle>, map: ShardMap) -> Self {
        Self { shards, map }
    }

    /// Get the shard handle for an instrument
    pub fn shard_for(&self, instrument_id: &str) -> Option<&ShardHandle> {
        self.shards.get(self.map.shard_index(instrument_id))
    }

    /// Forward an event to its instrument's shard
    pub async fn route(&self, event: MarketEvent) -> Result<(), EngineError> {
        let shard = self
            .shard_for(event.instrument_id())
            .ok_or(EngineError::ShardShutdown(0))?;
        shard.send(event).await
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StrategyRegistryBuilder;
    use polybot_core::InstrumentLimit;
    use polybot_strategy::Strategy;
    use rust_decimal_macros::dec;

    struct Named(&'static str);

    impl Strategy for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    /// Hashes by the trailing digit so tests can predict placement
    struct LastDigit;

    impl ShardingStrategy for LastDigit {
        fn shard_index(&self, instrument_id: &str, num_shards: usize) -> usize {
            let digit = instrument_id
                .chars()
                .last()
                .and_then(|c| c.to_digit(10))
                .unwrap_or(0) as usize;
            digit % num_shards.max(1)
        }
    }

    fn registry(registrations: &[(&'static str, &[&str])]) -> StrategyRegistry {
        let mut builder = StrategyRegistryBuilder::new();
        for (name, instruments) in registrations {
            let limits: Vec<_> = instruments
                .iter()
                .map(|id| InstrumentLimit::symmetric(*id, dec!(10), dec!(10)))
                .collect();
            builder
                .register_strategy(Named(*name), instruments.iter().copied(), limits)
                .unwrap();
        }
        builder.build().unwrap().0
    }

    #[test]
    fn test_consistent_hash_is_stable_and_in_range() {
        let strategy = ConsistentHashStrategy;
        for id in ["0x1", "0x2", "0xdeadbeef", ""] {
            let first = strategy.shard_index(id, 7);
            assert!(first < 7);
            assert_eq!(strategy.shard_index(id, 7), first);
        }
        assert_eq!(strategy.shard_index("0x1", 1), 0);
        assert_eq!(strategy.shard_index("0x1", 0), 0);
    }

    #[test]
    fn test_instruments_sharing_a_strategy_share_a_shard() {
        let registry = registry(&[("pair", &["0x1", "0x2", "0x3"]), ("solo", &["0x5"])]);
        let map = ShardMap::new(&registry, 4, Arc::new(LastDigit));

        // Anchored on 0x1
        assert_eq!(map.shard_index("0x1"), 1);
        assert_eq!(map.shard_index("0x2"), 1);
        assert_eq!(map.shard_index("0x3"), 1);
        assert_eq!(map.shard_index("0x5"), 1);
        // Unrouted instruments keep their own hash
        assert_eq!(map.shard_index("0x6"), 2);
    }

    #[test]
    fn test_groups_join_through_chains_of_strategies() {
        let registry = registry(&[
            ("a", &["0x2", "0x6"]),
            ("b", &["0x7"]),
            ("c", &["0x6", "0x7"]),
            ("d", &["0x3"]),
        ]);
        let map = ShardMap::new(&registry, 4, Arc::new(LastDigit));

        // a and b are linked through c, anchored on 0x2
        for id in ["0x2", "0x6", "0x7"] {
            assert_eq!(map.shard_index(id), 2, "{}", id);
        }
        assert_eq!(map.shard_index("0x3"), 3);

        let groups = strategy_groups(&registry);
        assert_eq!(groups.len(), 2);
    }
}
