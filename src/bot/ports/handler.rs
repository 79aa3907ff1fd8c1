//! Handler contract driven by the dispatch loop.

use crate::messaging::domain::InboundEvent;
use async_trait::async_trait;

/// Consumer of inbound chat events.
///
/// `handle` is infallible: implementations turn every failure into a reply
/// or a log line, and the dispatch loop isolates panics.
#[async_trait]
pub trait InboundHandler: Send + Sync + 'static {
    /// Handles one event to completion.
    async fn handle(&self, event: InboundEvent);

    /// Periodic maintenance, run between event batches.
    fn housekeeping(&self) {}
}
