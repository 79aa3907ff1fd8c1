//! In-memory event source fed by tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::messaging::{
    domain::InboundEvent,
    ports::{EventSource, TransportError, TransportResult},
};

/// Event source that replays queued batches in order.
///
/// When the queue is empty, [`EventSource::next_events`] waits for the idle
/// interval and returns an empty batch, like a long poll that timed out.
#[derive(Debug, Clone)]
pub struct InMemoryEventSource {
    batches: Arc<Mutex<VecDeque<TransportResult<Vec<InboundEvent>>>>>,
    closed: Arc<AtomicBool>,
    idle: Duration,
}

impl Default for InMemoryEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventSource {
    /// Creates an empty source with a 5 ms idle interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(VecDeque::new())),
            closed: Arc::new(AtomicBool::new(false)),
            idle: Duration::from_millis(5),
        }
    }

    /// Queues a batch of events.
    pub async fn push_batch(&self, events: Vec<InboundEvent>) {
        self.batches.lock().await.push_back(Ok(events));
    }

    /// Queues a failed poll.
    pub async fn push_error(&self, error: TransportError) {
        self.batches.lock().await.push_back(Err(error));
    }

    /// Returns the number of batches not yet consumed.
    #[must_use]
    pub async fn pending(&self) -> usize {
        self.batches.lock().await.len()
    }

    /// Returns whether [`EventSource::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn next_events(&self) -> TransportResult<Vec<InboundEvent>> {
        let next = self.batches.lock().await.pop_front();
        if let Some(batch) = next {
            return batch;
        }
        tokio::time::sleep(self.idle).await;
        Ok(Vec::new())
    }

    async fn close(&self) -> TransportResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
