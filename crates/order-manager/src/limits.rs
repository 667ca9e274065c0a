//! Per-instrument Limits
//!
//! Decides whether an order intent fits inside its instrument's bounds given
//! the current position. Stateless: the caller supplies the position.

use crate::error::{Error, Result};
use crate::position::Position;
use log::info;
use polybot_core::{InstrumentId, InstrumentLimit, Order, Side, ValidationError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

/// Which bound of an [`InstrumentLimit`] was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitBound {
    PositionBid,
    PositionAsk,
    NominalPositionBid,
    NominalPositionAsk,
}

impl LimitBound {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitBound::PositionBid => "max_position_bid",
            LimitBound::PositionAsk => "max_position_ask",
            LimitBound::NominalPositionBid => "max_nominal_position_bid",
            LimitBound::NominalPositionAsk => "max_nominal_position_ask",
        }
    }
}

/// One violated bound with the exposure the order would have produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitViolation {
    pub bound: LimitBound,
    pub projected: Decimal,
    pub limit: Decimal,
}

impl fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} projected={} limit={}",
            self.bound.as_str(),
            self.projected,
            self.limit
        )
    }
}

/// Why an order intent was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No limit registered for the instrument (fail closed)
    NoLimit,
    /// Non-positive price or volume, or empty instrument id
    InvalidOrder(ValidationError),
    /// The projected position would leave the decimal range
    Overflow,
    /// Every bound the order would breach
    Violations(Vec<LimitViolation>),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoLimit => f.write_str("no limit registered"),
            RejectReason::InvalidOrder(e) => write!(f, "invalid order: {}", e),
            RejectReason::Overflow => f.write_str("projected position out of range"),
            RejectReason::Violations(violations) => {
                for (i, v) in violations.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome of a limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitDecision {
    Accept,
    Reject(RejectReason),
}

impl LimitDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, LimitDecision::Accept)
    }

    pub fn is_reject(&self) -> bool {
        !self.is_accept()
    }

    /// Violated bounds, empty unless rejected for exceeding a limit
    pub fn violations(&self) -> &[LimitViolation] {
        match self {
            LimitDecision::Reject(RejectReason::Violations(v)) => v,
            _ => &[],
        }
    }
}

/// Holds one [`InstrumentLimit`] per instrument
///
/// Setting a limit for an instrument that already has one replaces it
/// (last write wins).
#[derive(Debug, Clone, Default)]
pub struct LimitEngine {
    limits: HashMap<InstrumentId, InstrumentLimit>,
}

impl LimitEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a limit, returning the one it replaced
    pub fn set_limit(&mut self, limit: InstrumentLimit) -> Result<Option<InstrumentLimit>> {
        limit.validate()?;
        let previous = self.limits.insert(limit.instrument_id.clone(), limit);
        if let Some(prev) = &previous {
            info!(
                "[limits] Limit for {} replaced (last write wins): {:?}",
                prev.instrument_id, prev
            );
        }
        Ok(previous)
    }

    pub fn limit_for(&self, instrument_id: &str) -> Option<&InstrumentLimit> {
        self.limits.get(instrument_id)
    }

    /// Like [`LimitEngine::limit_for`] but missing limits are an error
    pub fn require(&self, instrument_id: &str) -> Result<&InstrumentLimit> {
        self.limit_for(instrument_id)
            .ok_or_else(|| Error::UnknownInstrument(instrument_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Check `order` against its instrument's limit given `current`.
    ///
    /// Bounds are inclusive. Both bounds on the order's side are evaluated so
    /// the rejection reports every one that is breached.
    ///
    /// The ask nominal bound is checked against the negated running notional,
    /// not against the notional of the open short. After a round trip that
    /// sold above its buy price the position is flat with negative notional,
    /// so a later sell starts from that credit and a `max_nominal_position_ask`
    /// of zero refuses it even though no short is open.
    pub fn check(&self, order: &Order, current: &Position) -> LimitDecision {
        match self.project(order, current) {
            Ok(_) => LimitDecision::Accept,
            Err(reason) => LimitDecision::Reject(reason),
        }
    }

    /// Position `order` would produce from `current` if it passes every bound
    pub fn project(
        &self,
        order: &Order,
        current: &Position,
    ) -> std::result::Result<Position, RejectReason> {
        if let Err(e) = order.validate() {
            return Err(RejectReason::InvalidOrder(e));
        }
        let Some(limit) = self.limit_for(&order.instrument_id) else {
            return Err(RejectReason::NoLimit);
        };
        let Some(projected) = current.after(order.side, order.price, order.volume) else {
            return Err(RejectReason::Overflow);
        };

        // Exposure on the order's side: long for bids, short magnitude for asks
        let bounds = match order.side {
            Side::Buy => [
                (LimitBound::PositionBid, projected.quantity, limit.max_position_bid),
                (
                    LimitBound::NominalPositionBid,
                    projected.notional,
                    limit.max_nominal_position_bid,
                ),
            ],
            Side::Sell => [
                (LimitBound::PositionAsk, -projected.quantity, limit.max_position_ask),
                (
                    LimitBound::NominalPositionAsk,
                    -projected.notional,
                    limit.max_nominal_position_ask,
                ),
            ],
        };

        let violations: Vec<LimitViolation> = bounds
            .into_iter()
            .filter(|(_, value, max)| value > max)
            .map(|(bound, value, max)| LimitViolation {
                bound,
                projected: value,
                limit: max,
            })
            .collect();

        if violations.is_empty() {
            Ok(projected)
        } else {
            Err(RejectReason::Violations(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn engine_with(limit: InstrumentLimit) -> LimitEngine {
        let mut engine = LimitEngine::new();
        engine.set_limit(limit).unwrap();
        engine
    }

    #[test]
    fn test_bid_boundary_is_inclusive() {
        let engine = engine_with(InstrumentLimit::new(
            "0x1",
            dec!(100),
            dec!(100),
            dec!(1000),
            dec!(1000),
        ));
        let current = Position::new(dec!(95), dec!(950));

        // Projected 100 / 1000: exactly at both bounds
        let decision = engine.check(&Order::buy("0x1", dec!(10), dec!(5)), &current);
        assert_eq!(decision, LimitDecision::Accept);

        // Projected 101 / 1010: both bounds breached, both reported
        let decision = engine.check(&Order::buy("0x1", dec!(10), dec!(6)), &current);
        assert_eq!(
            decision.violations(),
            &[
                LimitViolation {
                    bound: LimitBound::PositionBid,
                    projected: dec!(101),
                    limit: dec!(100),
                },
                LimitViolation {
                    bound: LimitBound::NominalPositionBid,
                    projected: dec!(1010),
                    limit: dec!(1000),
                },
            ]
        );
    }

    #[test]
    fn test_sell_uses_short_magnitude() {
        let engine = engine_with(InstrumentLimit::new(
            "0x1",
            dec!(0),
            dec!(10),
            dec!(0),
            dec!(100),
        ));
        let current = Position::new(dec!(-8), dec!(-4));

        assert!(engine.check(&Order::sell("0x1", dec!(0.5), dec!(2)), &current).is_accept());

        let decision = engine.check(&Order::sell("0x1", dec!(0.5), dec!(3)), &current);
        assert_eq!(decision.violations().len(), 1);
        assert_eq!(decision.violations()[0].bound, LimitBound::PositionAsk);
        assert_eq!(decision.violations()[0].projected, dec!(11));
    }

    #[test]
    fn test_sell_reducing_long_is_unconstrained_by_ask_limit() {
        let engine = engine_with(InstrumentLimit::symmetric("0x1", dec!(0), dec!(0)));
        let current = Position::new(dec!(5), dec!(2));
        // Closes the long entirely, short exposure stays at zero
        assert!(engine.check(&Order::sell("0x1", dec!(0.4), dec!(5)), &current).is_accept());
    }

    #[test]
    fn test_only_nominal_bound_breached() {
        let engine = engine_with(InstrumentLimit::symmetric("0x1", dec!(1000), dec!(10)));
        let decision = engine.check(&Order::buy("0x1", dec!(0.9), dec!(12)), &Position::default());
        assert_eq!(decision.violations().len(), 1);
        assert_eq!(decision.violations()[0].bound, LimitBound::NominalPositionBid);
    }

    #[test]
    fn test_missing_limit_fails_closed() {
        let engine = LimitEngine::new();
        let decision = engine.check(&Order::buy("0x1", dec!(0.1), dec!(1)), &Position::default());
        assert_eq!(decision, LimitDecision::Reject(RejectReason::NoLimit));
        assert_eq!(engine.require("0x1"), Err(Error::UnknownInstrument("0x1".into())));
    }

    #[test]
    fn test_invalid_order_rejected() {
        let engine = engine_with(InstrumentLimit::symmetric("0x1", dec!(10), dec!(10)));
        let decision = engine.check(&Order::buy("0x1", dec!(0), dec!(1)), &Position::default());
        assert!(matches!(
            decision,
            LimitDecision::Reject(RejectReason::InvalidOrder(ValidationError::NonPositivePrice(_)))
        ));
        let decision = engine.check(&Order::sell("0x1", dec!(0.5), dec!(-1)), &Position::default());
        assert!(decision.is_reject());
    }

    #[test]
    fn test_out_of_range_order_rejected() {
        let engine = engine_with(InstrumentLimit::symmetric("0x1", dec!(10), dec!(10)));
        let huge = Decimal::from(1_000_000_000_000_000i64);
        let decision = engine.check(&Order::buy("0x1", huge, huge), &Position::default());
        assert_eq!(decision, LimitDecision::Reject(RejectReason::Overflow));

        let at_max = Position::new(dec!(0), Decimal::MIN);
        let decision = engine.check(&Order::sell("0x1", dec!(0.5), dec!(1)), &at_max);
        assert_eq!(decision, LimitDecision::Reject(RejectReason::Overflow));
    }

    #[test]
    fn test_ask_nominal_counts_realized_credit() {
        let engine = engine_with(InstrumentLimit::new(
            "0x1",
            dec!(100),
            dec!(100),
            dec!(100),
            dec!(0),
        ));
        // Bought 10 @ 0.40, sold 10 @ 0.60: flat, notional -2
        let flat = Position::default()
            .after(Side::Buy, dec!(0.40), dec!(10))
            .and_then(|p| p.after(Side::Sell, dec!(0.60), dec!(10)))
            .unwrap();
        assert!(flat.is_flat());
        assert_eq!(flat.notional, dec!(-2));

        // No short is open, yet -(-2 - 0.5) = 2.5 > 0
        let decision = engine.check(&Order::sell("0x1", dec!(0.5), dec!(1)), &flat);
        assert_eq!(
            decision.violations(),
            &[LimitViolation {
                bound: LimitBound::NominalPositionAsk,
                projected: dec!(2.5),
                limit: dec!(0),
            }]
        );

        let projected = engine
            .project(&Order::buy("0x1", dec!(0.5), dec!(1)), &flat)
            .unwrap();
        assert_eq!(projected, Position::new(dec!(1), dec!(-1.5)));
    }

    #[test]
    fn test_last_write_wins() {
        let mut engine = engine_with(InstrumentLimit::symmetric("0x1", dec!(5), dec!(100)));
        let order = Order::buy("0x1", dec!(1), dec!(8));
        assert!(engine.check(&order, &Position::default()).is_reject());

        let previous = engine
            .set_limit(InstrumentLimit::symmetric("0x1", dec!(10), dec!(100)))
            .unwrap();
        assert_eq!(previous.unwrap().max_position_bid, dec!(5));
        assert!(engine.check(&order, &Position::default()).is_accept());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_negative_limit_refused() {
        let mut engine = LimitEngine::new();
        let result = engine.set_limit(InstrumentLimit::symmetric("0x1", dec!(-1), dec!(10)));
        assert!(matches!(result, Err(Error::InvalidLimit(_))));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_reject_reason_display_lists_every_bound() {
        let engine = engine_with(InstrumentLimit::symmetric("0x1", dec!(1), dec!(1)));
        let decision = engine.check(&Order::buy("0x1", dec!(0.5), dec!(4)), &Position::default());
        let LimitDecision::Reject(reason) = decision else {
            panic!("expected rejection");
        };
        assert_eq!(
            reason.to_string(),
            "max_position_bid projected=4 limit=1; max_nominal_position_bid projected=2.0 limit=1"
        );
    }
}
