//! Strategy Registry
//!
//! Registrations accumulate in a [`StrategyRegistryBuilder`] until the engine
//! starts. The builder is then frozen into an immutable [`StrategyRegistry`]
//! (shared read-only by every shard) plus the [`LimitEngine`] the risk gate
//! checks against.

use crate::error::RegistrationError;
use log::{info, warn};
use parking_lot::Mutex;
use polybot_core::{InstrumentId, InstrumentLimit};
use polybot_order_manager::LimitEngine;
use polybot_strategy::Strategy;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Position of a strategy in registration order
pub type StrategyId = usize;

/// Shared by every router; the engine pins a strategy's instruments to one
/// shard, so the lock is only ever taken from that shard's task
pub type SharedStrategy = Arc<Mutex<Box<dyn Strategy>>>;

/// One registered strategy and the instruments it listens to
pub struct RegisteredStrategy {
    pub id: StrategyId,
    pub name: String,
    pub instruments: BTreeSet<InstrumentId>,
    handle: SharedStrategy,
}

impl RegisteredStrategy {
    pub fn handle(&self) -> &SharedStrategy {
        &self.handle
    }
}

impl std::fmt::Debug for RegisteredStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredStrategy")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("instruments", &self.instruments)
            .finish()
    }
}

/// Collects registrations before startup
#[derive(Debug, Default)]
pub struct StrategyRegistryBuilder {
    strategies: Vec<RegisteredStrategy>,
    limits: LimitEngine,
}

impl StrategyRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `strategy` for `instrument_ids` with one limit per instrument.
    ///
    /// The call is validated as a whole and leaves the builder untouched on
    /// error. Limits replace earlier ones for the same instrument (last write
    /// wins), including limits for instruments outside `instrument_ids`.
    pub fn register_strategy<S, I, L>(
        &mut self,
        strategy: S,
        instrument_ids: I,
        limits: L,
    ) -> Result<StrategyId, RegistrationError>
    where
        S: Strategy + 'static,
        I: IntoIterator,
        I::Item: Into<InstrumentId>,
        L: IntoIterator<Item = InstrumentLimit>,
    {
        self.register_boxed(
            Box::new(strategy),
            instrument_ids.into_iter().map(Into::into).collect(),
            limits.into_iter().collect(),
        )
    }

    pub fn register_boxed(
        &mut self,
        strategy: Box<dyn Strategy>,
        instrument_ids: BTreeSet<InstrumentId>,
        limits: Vec<InstrumentLimit>,
    ) -> Result<StrategyId, RegistrationError> {
        let name = strategy.name().to_string();

        if self.strategies.iter().any(|s| s.name == name) {
            return Err(RegistrationError::DuplicateStrategy(name));
        }
        if instrument_ids.is_empty() {
            return Err(RegistrationError::EmptyInstrumentSet { strategy: name });
        }
        for limit in &limits {
            limit
                .validate()
                .map_err(|source| RegistrationError::InvalidLimit {
                    strategy: name.clone(),
                    source,
                })?;
        }
        if let Some(missing) = instrument_ids
            .iter()
            .find(|id| !limits.iter().any(|l| &l.instrument_id == *id))
        {
            return Err(RegistrationError::MissingLimit {
                strategy: name,
                instrument_id: missing.clone(),
            });
        }

        for limit in limits {
            self.limits
                .set_limit(limit)
                .map_err(|e| match e {
                    polybot_order_manager::Error::InvalidLimit(source) => {
                        RegistrationError::InvalidLimit {
                            strategy: name.clone(),
                            source,
                        }
                    }
                    polybot_order_manager::Error::UnknownInstrument(instrument_id) => {
                        RegistrationError::MissingLimit {
                            strategy: name.clone(),
                            instrument_id,
                        }
                    }
                })?;
        }

        let id = self.strategies.len();
        info!(
            "[registry] Registered strategy {} (#{}) on {} instrument(s)",
            name,
            id,
            instrument_ids.len()
        );
        self.strategies.push(RegisteredStrategy {
            id,
            name,
            instruments: instrument_ids,
            handle: Arc::new(Mutex::new(strategy)),
        });
        Ok(id)
    }

    /// Limits registered so far
    pub fn limits(&self) -> &LimitEngine {
        &self.limits
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Freeze registrations.
    ///
    /// Fails if any routed instrument ended up without a limit, so the engine
    /// never consumes market data in that state.
    pub fn build(self) -> Result<(StrategyRegistry, LimitEngine), RegistrationError> {
        let mut routes: HashMap<InstrumentId, Vec<StrategyId>> = HashMap::new();
        for strategy in &self.strategies {
            for instrument_id in &strategy.instruments {
                if self.limits.require(instrument_id).is_err() {
                    return Err(RegistrationError::MissingLimit {
                        strategy: strategy.name.clone(),
                        instrument_id: instrument_id.clone(),
                    });
                }
                routes
                    .entry(instrument_id.clone())
                    .or_default()
                    .push(strategy.id);
            }
        }

        if self.strategies.is_empty() {
            warn!("[registry] No strategies registered, market data will not trigger callbacks");
        }

        let registry = StrategyRegistry {
            strategies: self.strategies,
            routes,
        };
        Ok((registry, self.limits))
    }
}

/// Instrument to strategy mapping, fixed at startup
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: Vec<RegisteredStrategy>,
    routes: HashMap<InstrumentId, Vec<StrategyId>>,
}

impl StrategyRegistry {
    /// Strategies registered on `instrument_id`, in registration order
    pub fn routes_for(&self, instrument_id: &str) -> &[StrategyId] {
        self.routes
            .get(instrument_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_routed(&self, instrument_id: &str) -> bool {
        self.routes.contains_key(instrument_id)
    }

    pub fn strategy(&self, id: StrategyId) -> Option<&RegisteredStrategy> {
        self.strategies.get(id)
    }

    pub fn strategies(&self) -> &[RegisteredStrategy] {
        &self.strategies
    }

    /// Every instrument with at least one strategy
    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
