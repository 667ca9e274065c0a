use async_trait::async_trait;
use polybot_core::AcceptedOrder;

use crate::error::ExecutionError;

/// Port for outbound orders
///
/// Receives only orders that already passed the risk gate. Signing and
/// venue submission happen behind this trait.
#[async_trait]
pub trait ExecutionLink: Send + Sync {
    /// Hand an accepted order to the venue
    async fn send_order(&self, order: AcceptedOrder) -> Result<(), ExecutionError>;

    /// Name for logging
    fn name(&self) -> &str {
        "ExecutionLink"
    }
}
