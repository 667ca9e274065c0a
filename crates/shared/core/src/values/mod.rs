use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal so limit comparisons stay exact
pub type Price = Decimal;

/// Quantity/volume/size value
pub type Quantity = Decimal;

/// Dollar value of exposure (price * quantity)
pub type Notional = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Opaque identifier for a tradable contract (e.g. a Polymarket token id)
pub type InstrumentId = String;
