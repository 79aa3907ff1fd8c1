//! Inbound event source port.

use super::TransportResult;
use crate::messaging::domain::InboundEvent;
use async_trait::async_trait;

/// Stream of inbound chat events, pulled in batches.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Waits for the next batch of events.
    ///
    /// Returns an empty batch when the wait window elapses without events.
    /// Events in a batch are in arrival order and are considered consumed
    /// once returned.
    async fn next_events(&self) -> TransportResult<Vec<InboundEvent>>;

    /// Releases the underlying connection. Called once, after the dispatch
    /// loop has finished handling in-flight events.
    async fn close(&self) -> TransportResult<()>;
}
