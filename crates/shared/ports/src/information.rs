use async_trait::async_trait;
use polybot_core::MarketEvent;

use crate::error::FeedError;

/// One message from the feed: a decoded event, or an error for a message
/// that could not be turned into one.
pub type FeedMessage = Result<MarketEvent, FeedError>;

/// Port for the inbound market data stream
///
/// Implementations own reconnect, backpressure and deduplication. Events for
/// any single instrument must come out in arrival order; stale incremental
/// state is signalled with [`MarketEvent::Reset`].
#[async_trait]
pub trait InformationLink: Send {
    /// Wait for the next message. `None` means the stream has ended.
    async fn next_message(&mut self) -> Option<FeedMessage>;

    /// Name for logging
    fn name(&self) -> &str {
        "InformationLink"
    }
}
