mod book_level;
mod limit;
mod order;
mod position;
mod side;
mod trade;

pub use book_level::BookLevel;
pub use limit::InstrumentLimit;
pub use order::{AcceptedOrder, ClientOrderId, Order};
pub use position::{Position, PositionReader};
pub use side::Side;
pub use trade::Trade;
