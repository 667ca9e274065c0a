//! Pre-trade Risk Gate
//!
//! Every order intent passes through [`RiskGate::submit`]. The limit check and
//! the position update for an accepted intent happen under the instrument's
//! position lock, so a later intent always sees the exposure of an earlier
//! accepted one and a rejected intent leaves the position untouched.

use crate::limits::{LimitDecision, LimitEngine, RejectReason};
use crate::position::{Position, PositionTracker};
use log::{debug, warn};
use polybot_core::Order;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by the gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskStats {
    pub accepted: u64,
    pub rejected: u64,
}

/// Checks intents against limits and books accepted ones into positions
#[derive(Debug)]
pub struct RiskGate {
    limits: Arc<LimitEngine>,
    positions: Arc<PositionTracker>,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl RiskGate {
    pub fn new(limits: Arc<LimitEngine>, positions: Arc<PositionTracker>) -> Self {
        Self {
            limits,
            positions,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Check `order` and, if it fits, apply it to the position.
    ///
    /// All-or-nothing: a rejected order is never resized.
    pub fn submit(&self, order: &Order) -> LimitDecision {
        // Unknown instruments must not grow the position map
        let decision = if self.limits.limit_for(&order.instrument_id).is_none() {
            LimitDecision::Reject(RejectReason::NoLimit)
        } else {
            self.positions.update(&order.instrument_id, |position| {
                match self.limits.project(order, position) {
                    Ok(projected) => {
                        *position = projected;
                        LimitDecision::Accept
                    }
                    Err(reason) => LimitDecision::Reject(reason),
                }
            })
        };

        match &decision {
            LimitDecision::Accept => {
                self.accepted.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "[risk] Accepted {} {} {} @ {}",
                    order.instrument_id, order.side, order.volume, order.price
                );
            }
            LimitDecision::Reject(reason) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "[RISK REJECTED] {} {} {} @ {}: {}",
                    order.instrument_id, order.side, order.volume, order.price, reason
                );
            }
        }
        decision
    }

    pub fn position_of(&self, instrument_id: &str) -> Position {
        self.positions.position_of(instrument_id)
    }

    pub fn positions(&self) -> &Arc<PositionTracker> {
        &self.positions
    }

    pub fn limits(&self) -> &Arc<LimitEngine> {
        &self.limits
    }

    pub fn stats(&self) -> RiskStats {
        RiskStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
