//! Event Router
//!
//! One router runs inside each shard and owns the books of the instruments
//! hashed to it. For every event it updates the book, invokes the registered
//! strategies in registration order and pushes their orders, in order, through
//! the shared risk gate. Each callback also gets a [`StrategyContext`] over
//! this router's books and the shared positions.

use crate::config::UnroutedPolicy;
use crate::registry::{RegisteredStrategy, StrategyRegistry};
use log::{debug, error, warn};
use polybot_core::{AcceptedOrder, InstrumentId, MarketEvent, Order, Trade};
use polybot_order_manager::{LimitDecision, PositionReader, RejectReason, RiskGate};
use polybot_strategy::{OrderBook, StrategyContext, StrategyError, StrategyResult};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// An order intent the risk gate refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOrder {
    pub strategy: String,
    pub order: Order,
    pub reason: RejectReason,
}

/// What happened while routing one event
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Orders that passed the risk gate, in emission order
    pub accepted: Vec<AcceptedOrder>,
    pub rejected: Vec<RejectedOrder>,
    /// Number of callbacks invoked
    pub callbacks: usize,
    /// Callbacks that returned an error or panicked
    pub failures: usize,
}

/// Per-router counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub events: u64,
    /// Book inputs refused by the book (invalid level, delta while awaiting a snapshot)
    pub book_errors: u64,
    /// Events discarded under [`UnroutedPolicy::Drop`]
    pub unrouted_dropped: u64,
    pub callbacks: u64,
    pub callback_failures: u64,
    pub orders_accepted: u64,
    pub orders_rejected: u64,
}

/// Which callback an event triggers
enum Callback {
    Trade(Trade),
    BookChange,
}

pub struct EventRouter {
    registry: Arc<StrategyRegistry>,
    gate: Arc<RiskGate>,
    books: HashMap<InstrumentId, OrderBook>,
    unrouted: UnroutedPolicy,
    stats: RouterStats,
}

impl EventRouter {
    pub fn new(registry: Arc<StrategyRegistry>, gate: Arc<RiskGate>, unrouted: UnroutedPolicy) -> Self {
        Self {
            registry,
            gate,
            books: HashMap::new(),
            unrouted,
            stats: RouterStats::default(),
        }
    }

    /// Route one event through book update, callbacks and the risk gate
    pub fn dispatch(&mut self, event: MarketEvent) -> DispatchOutcome {
        self.stats.events += 1;
        let mut outcome = DispatchOutcome::default();

        let instrument_id = event.instrument_id().to_string();
        let routes = self.registry.routes_for(&instrument_id);

        if routes.is_empty() && self.unrouted == UnroutedPolicy::Drop {
            self.stats.unrouted_dropped += 1;
            debug!(
                "[router] Dropped {} for unrouted instrument {}",
                event.kind(),
                instrument_id
            );
            return outcome;
        }

        let callback = {
            let book = self
                .books
                .entry(instrument_id.clone())
                .or_insert_with(|| OrderBook::new(instrument_id.clone()));

            let callback = match event {
                MarketEvent::Trade {
                    instrument_id,
                    price,
                    volume,
                    side,
                } => Callback::Trade(Trade::new(instrument_id, price, volume, side)),
                MarketEvent::BookDelta {
                    side, price, size, ..
                } => {
                    if let Err(e) = book.apply_delta(side, price, size) {
                        self.stats.book_errors += 1;
                        warn!("[router] Dropped book delta for {}: {}", instrument_id, e);
                        return outcome;
                    }
                    Callback::BookChange
                }
                MarketEvent::BookSnapshot { levels, .. } => {
                    if let Err(e) = book.apply_snapshot(&levels) {
                        self.stats.book_errors += 1;
                        warn!("[router] Dropped book snapshot for {}: {}", instrument_id, e);
                        return outcome;
                    }
                    Callback::BookChange
                }
                MarketEvent::Reset { .. } => {
                    debug!("[router] Reset {}, awaiting snapshot", instrument_id);
                    book.reset();
                    Callback::BookChange
                }
            };

            if book.is_crossed() {
                debug!("[router] Book crossed: {}", book);
            }
            callback
        };

        let Some(book) = self.books.get(&instrument_id) else {
            return outcome;
        };
        let positions: &dyn PositionReader = &**self.gate.positions();

        // Concatenate in registration order, list order within a strategy
        let mut intents: Vec<(&RegisteredStrategy, Order)> = Vec::new();
        for &id in routes {
            let Some(strategy) = self.registry.strategy(id) else {
                continue;
            };
            outcome.callbacks += 1;
            let ctx = StrategyContext::new(positions, &self.books, &strategy.instruments);
            match invoke(strategy, &instrument_id, &callback, book, &ctx) {
                Ok(orders) => intents.extend(orders.into_iter().map(|o| (strategy, o))),
                Err(e) => {
                    outcome.failures += 1;
                    error!(
                        "[router] Strategy {} failed on {}: {}",
                        strategy.name, instrument_id, e
                    );
                }
            }
        }

        // Sequential: each acceptance is visible to the next check
        for (strategy, order) in intents {
            match self.gate.submit(&order) {
                LimitDecision::Accept => {
                    outcome
                        .accepted
                        .push(AcceptedOrder::new(strategy.name.clone(), order));
                }
                LimitDecision::Reject(reason) => outcome.rejected.push(RejectedOrder {
                    strategy: strategy.name.clone(),
                    order,
                    reason,
                }),
            }
        }

        self.stats.callbacks += outcome.callbacks as u64;
        self.stats.callback_failures += outcome.failures as u64;
        self.stats.orders_accepted += outcome.accepted.len() as u64;
        self.stats.orders_rejected += outcome.rejected.len() as u64;
        outcome
    }

    /// Book for `instrument_id` if any event for it has been applied
    pub fn book(&self, instrument_id: &str) -> Option<&OrderBook> {
        self.books.get(instrument_id)
    }

    pub fn books(&self) -> impl Iterator<Item = &OrderBook> {
        self.books.values()
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }
}

/// Run one callback, turning a panic into a [`StrategyError`]
fn invoke(
    strategy: &RegisteredStrategy,
    instrument_id: &str,
    callback: &Callback,
    book: &OrderBook,
    ctx: &StrategyContext<'_>,
) -> StrategyResult {
    let mut guard = strategy.handle().lock();
    let result = catch_unwind(AssertUnwindSafe(|| match callback {
        Callback::Trade(trade) => guard.on_trade(instrument_id, trade, book, ctx),
        Callback::BookChange => guard.on_order_book_change(instrument_id, book, ctx),
    }));

    result.unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(StrategyError::Panicked(message))
    })
}
