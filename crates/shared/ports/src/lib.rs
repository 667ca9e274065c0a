//! Polybot Ports
//!
//! Port definitions (traits) for the boundaries of the tick-to-trade pipeline:
//!
//! - [`InformationLink`]: produces the normalized, in-order market event stream
//! - [`ExecutionLink`]: consumes order intents that passed the risk gate
//!
//! Transport, reconnect and signing live behind these traits. The
//! [`channel`] module provides in-process adapters built on tokio channels.

pub mod channel;
mod error;
mod execution;
mod information;

pub use channel::{
    ChannelExecutionLink, ChannelInformationLink, FeedSender, JsonInformationLink,
    RawFeedSender,
};
pub use error::{ExecutionError, FeedError};
pub use execution::ExecutionLink;
pub use information::{FeedMessage, InformationLink};
