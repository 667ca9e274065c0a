//! Strategies shared by the runner integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use polybot_core::{InstrumentLimit, Order, Trade};
use polybot_strategy::{OrderBook, Strategy, StrategyContext, StrategyError, StrategyResult};
use rust_decimal::Decimal;
use std::sync::Arc;

/// One callback as seen by a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Trade {
        strategy: String,
        instrument_id: String,
        price: Decimal,
    },
    BookChange {
        strategy: String,
        instrument_id: String,
        best_bid: Option<Decimal>,
        best_ask: Option<Decimal>,
    },
    /// What the context showed during a trade callback
    Context {
        strategy: String,
        instrument_id: String,
        /// Net quantity on the traded instrument
        position: Decimal,
        /// Best bid of every registered book the context exposes
        best_bids: Vec<(String, Option<Decimal>)>,
    },
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Records every callback and answers trades with fixed orders
pub struct Scripted {
    name: String,
    log: CallLog,
    on_trade: Vec<Order>,
    on_book: Vec<Order>,
    fail_on: Option<String>,
    panic_on: Option<String>,
    observe: bool,
}

impl Scripted {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            on_trade: Vec::new(),
            on_book: Vec::new(),
            fail_on: None,
            panic_on: None,
            observe: false,
        }
    }

    /// Also record a [`Call::Context`] on every trade
    pub fn observing(mut self) -> Self {
        self.observe = true;
        self
    }

    /// Orders returned from every `on_trade`
    pub fn trading(mut self, orders: Vec<Order>) -> Self {
        self.on_trade = orders;
        self
    }

    /// Orders returned from every `on_order_book_change`
    pub fn quoting(mut self, orders: Vec<Order>) -> Self {
        self.on_book = orders;
        self
    }

    /// Return an error for callbacks on `instrument_id`
    pub fn failing_on(mut self, instrument_id: &str) -> Self {
        self.fail_on = Some(instrument_id.to_string());
        self
    }

    /// Panic in callbacks on `instrument_id`
    pub fn panicking_on(mut self, instrument_id: &str) -> Self {
        self.panic_on = Some(instrument_id.to_string());
        self
    }

    fn trip(&self, instrument_id: &str) -> Result<(), StrategyError> {
        if self.panic_on.as_deref() == Some(instrument_id) {
            panic!("{} blew up on {}", self.name, instrument_id);
        }
        if self.fail_on.as_deref() == Some(instrument_id) {
            return Err(StrategyError::failed(format!("refusing {}", instrument_id)));
        }
        Ok(())
    }
}

impl Strategy for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_trade(
        &mut self,
        instrument_id: &str,
        trade: &Trade,
        _book: &OrderBook,
        ctx: &StrategyContext<'_>,
    ) -> StrategyResult {
        self.log.lock().push(Call::Trade {
            strategy: self.name.clone(),
            instrument_id: instrument_id.to_string(),
            price: trade.price,
        });
        if self.observe {
            self.log.lock().push(Call::Context {
                strategy: self.name.clone(),
                instrument_id: instrument_id.to_string(),
                position: ctx.position_of(instrument_id).quantity,
                best_bids: ctx
                    .books()
                    .map(|b| (b.instrument_id().to_string(), b.best_bid().map(|l| l.price)))
                    .collect(),
            });
        }
        self.trip(instrument_id)?;
        Ok(self.on_trade.clone())
    }

    fn on_order_book_change(
        &mut self,
        instrument_id: &str,
        book: &OrderBook,
        _ctx: &StrategyContext<'_>,
    ) -> StrategyResult {
        self.log.lock().push(Call::BookChange {
            strategy: self.name.clone(),
            instrument_id: instrument_id.to_string(),
            best_bid: book.best_bid().map(|l| l.price),
            best_ask: book.best_ask().map(|l| l.price),
        });
        self.trip(instrument_id)?;
        Ok(self.on_book.clone())
    }
}

pub fn limit(instrument_id: &str, max_position: Decimal, max_nominal: Decimal) -> InstrumentLimit {
    InstrumentLimit::symmetric(instrument_id, max_position, max_nominal)
}

/// Names of the strategies that saw a trade, in call order
pub fn trade_callers(log: &CallLog) -> Vec<(String, String)> {
    log.lock()
        .iter()
        .filter_map(|c| match c {
            Call::Trade {
                strategy,
                instrument_id,
                ..
            } => Some((strategy.clone(), instrument_id.clone())),
            _ => None,
        })
        .collect()
}

/// Every [`Call::Context`] recorded, in call order
pub fn contexts(log: &CallLog) -> Vec<Call> {
    log.lock()
        .iter()
        .filter(|c| matches!(c, Call::Context { .. }))
        .cloned()
        .collect()
}
