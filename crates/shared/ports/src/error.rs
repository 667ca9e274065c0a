use thiserror::Error;

/// Errors surfaced by an information link for a single message.
///
/// None of these stop the stream: the pipeline logs and drops the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Malformed feed message: {0}")]
    Malformed(String),

    #[error("Out-of-sequence message for {instrument_id}: expected {expected}, got {received}")]
    OutOfSequence {
        instrument_id: String,
        expected: u64,
        received: u64,
    },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors from handing an accepted order to the execution link
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Execution channel closed")]
    ChannelClosed,

    #[error("Order rejected by execution link: {0}")]
    Rejected(String),
}
