//! Tokio channel-based links for single-process mode
//!
//! Feed adapters and transports run in their own tasks and push into these
//! channels; the pipeline reads from the other end.

use crate::error::{ExecutionError, FeedError};
use crate::execution::ExecutionLink;
use crate::information::{FeedMessage, InformationLink};
use async_trait::async_trait;
use polybot_core::{AcceptedOrder, MarketEvent};
use tokio::sync::mpsc;

/// Producer half of a [`ChannelInformationLink`]
#[derive(Clone)]
pub struct FeedSender {
    tx: mpsc::Sender<FeedMessage>,
}

impl FeedSender {
    /// Push a decoded event
    pub async fn send_event(&self, event: MarketEvent) -> Result<(), FeedError> {
        self.tx
            .send(Ok(event))
            .await
            .map_err(|_| FeedError::Transport("feed channel closed".to_string()))
    }

    /// Push an error for a message that could not be decoded
    pub async fn send_error(&self, error: FeedError) -> Result<(), FeedError> {
        self.tx
            .send(Err(error))
            .await
            .map_err(|_| FeedError::Transport("feed channel closed".to_string()))
    }
}

/// Information link reading already-decoded messages from an mpsc channel
pub struct ChannelInformationLink {
    rx: mpsc::Receiver<FeedMessage>,
}

impl ChannelInformationLink {
    pub fn new(rx: mpsc::Receiver<FeedMessage>) -> Self {
        Self { rx }
    }

    /// Create a sender/link pair with given capacity
    pub fn pair(capacity: usize) -> (FeedSender, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (FeedSender { tx }, Self { rx })
    }
}

#[async_trait]
impl InformationLink for ChannelInformationLink {
    async fn next_message(&mut self) -> Option<FeedMessage> {
        self.rx.recv().await
    }

    fn name(&self) -> &str {
        "ChannelInformationLink"
    }
}

/// Producer half of a [`JsonInformationLink`]
#[derive(Clone)]
pub struct RawFeedSender {
    tx: mpsc::Sender<String>,
}

impl RawFeedSender {
    /// Push one raw JSON text frame
    pub async fn send(&self, frame: impl Into<String>) -> Result<(), FeedError> {
        self.tx
            .send(frame.into())
            .await
            .map_err(|_| FeedError::Transport("feed channel closed".to_string()))
    }
}

/// Information link decoding JSON text frames into [`MarketEvent`]s
///
/// Frames are expected in the tagged form
/// `{"type":"book_delta","instrument_id":"..","side":"buy","price":"0.45","size":"10"}`.
/// A frame that does not decode is surfaced as [`FeedError::Malformed`].
pub struct JsonInformationLink {
    rx: mpsc::Receiver<String>,
    frames_seen: u64,
}

impl JsonInformationLink {
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx, frames_seen: 0 }
    }

    pub fn pair(capacity: usize) -> (RawFeedSender, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (RawFeedSender { tx }, Self::new(rx))
    }

    /// Number of frames read so far (decoded or not)
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    fn decode(frame: &str) -> FeedMessage {
        serde_json::from_str::<MarketEvent>(frame).map_err(|e| FeedError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl InformationLink for JsonInformationLink {
    async fn next_message(&mut self) -> Option<FeedMessage> {
        let frame = self.rx.recv().await?;
        self.frames_seen += 1;
        let message = Self::decode(&frame);
        if let Err(e) = &message {
            log::debug!("[json-feed] Frame {} failed to decode: {}", self.frames_seen, e);
        }
        Some(message)
    }

    fn name(&self) -> &str {
        "JsonInformationLink"
    }
}

/// Execution link forwarding accepted orders into an mpsc channel
#[derive(Clone)]
pub struct ChannelExecutionLink {
    tx: mpsc::Sender<AcceptedOrder>,
}

impl ChannelExecutionLink {
    pub fn new(tx: mpsc::Sender<AcceptedOrder>) -> Self {
        Self { tx }
    }

    /// Create a link and the receiver the venue adapter consumes
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<AcceptedOrder>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ExecutionLink for ChannelExecutionLink {
    async fn send_order(&self, order: AcceptedOrder) -> Result<(), ExecutionError> {
        self.tx
            .send(order)
            .await
            .map_err(|_| ExecutionError::ChannelClosed)
    }

    fn name(&self) -> &str {
        "ChannelExecutionLink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polybot_core::{Order, Side};
    use rust_decimal_macros::dec;

    // Ensure traits are object-safe
    fn _assert_information_link_object_safe(_: &mut dyn InformationLink) {}
    fn _assert_execution_link_object_safe(_: &dyn ExecutionLink) {}

    #[tokio::test]
    async fn test_channel_link_preserves_order_and_ends() {
        let (tx, mut link) = ChannelInformationLink::pair(16);
        tx.send_event(MarketEvent::reset("0x1")).await.unwrap();
        tx.send_error(FeedError::Malformed("garbage".to_string()))
            .await
            .unwrap();
        tx.send_event(MarketEvent::trade("0x1", dec!(0.5), dec!(1), Side::Buy))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(link.next_message().await, Some(Ok(MarketEvent::reset("0x1"))));
        assert!(matches!(
            link.next_message().await,
            Some(Err(FeedError::Malformed(_)))
        ));
        assert!(matches!(link.next_message().await, Some(Ok(MarketEvent::Trade { .. }))));
        assert_eq!(link.next_message().await, None);
    }

    #[tokio::test]
    async fn test_json_link_decodes_and_flags_malformed_frames() {
        let (tx, mut link) = JsonInformationLink::pair(16);
        tx.send(r#"{"type":"trade","instrument_id":"0x1","price":"0.55","volume":"3","side":"sell"}"#)
            .await
            .unwrap();
        tx.send("{not json").await.unwrap();
        tx.send(r#"{"type":"unknown_kind","instrument_id":"0x1"}"#)
            .await
            .unwrap();
        drop(tx);

        assert_eq!(
            link.next_message().await,
            Some(Ok(MarketEvent::trade("0x1", dec!(0.55), dec!(3), Side::Sell)))
        );
        assert!(matches!(
            link.next_message().await,
            Some(Err(FeedError::Malformed(_)))
        ));
        assert!(matches!(
            link.next_message().await,
            Some(Err(FeedError::Malformed(_)))
        ));
        assert_eq!(link.next_message().await, None);
        assert_eq!(link.frames_seen(), 3);
    }

    #[tokio::test]
    async fn test_execution_link_forwards_and_detects_closed_channel() {
        let (link, mut rx) = ChannelExecutionLink::pair(4);
        let accepted = AcceptedOrder::new("mm", Order::buy("0x1", dec!(0.5), dec!(2)));
        link.send_order(accepted.clone()).await.unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.client_order_id, accepted.client_order_id);

        drop(rx);
        assert_eq!(
            link.send_order(accepted).await,
            Err(ExecutionError::ChannelClosed)
        );
    }
}
