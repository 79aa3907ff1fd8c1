//! Single consumer loop feeding inbound events to a handler.

use crate::bot::ports::InboundHandler;
use crate::messaging::domain::InboundEvent;
use crate::messaging::ports::EventSource;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Non-empty batches received.
    pub batches: u64,
    /// Events handed to the handler.
    pub handled: u64,
    /// Events whose handler panicked.
    pub panicked: u64,
    /// Failed polls.
    pub poll_failures: u64,
}

/// Pulls event batches from a source and handles them one at a time, in
/// arrival order.
///
/// Each event runs on its own task so a panicking handler is contained;
/// the loop waits for it before taking the next event. Cancellation stops
/// intake; a batch already pulled is handled to the end because the source
/// considers it consumed. The source is closed last.
pub struct DispatchLoop<S, H>
where
    S: EventSource,
    H: InboundHandler,
{
    source: Arc<S>,
    handler: Arc<H>,
    retry_delay: Duration,
}

impl<S, H> DispatchLoop<S, H>
where
    S: EventSource,
    H: InboundHandler,
{
    /// Creates a loop with a one second delay after failed polls.
    #[must_use]
    pub const fn new(source: Arc<S>, handler: Arc<H>) -> Self {
        Self {
            source,
            handler,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Overrides the delay after a failed poll.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Runs until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        info!("dispatch loop started");

        'intake: loop {
            let polled = tokio::select! {
                biased;
                () = shutdown.cancelled() => break 'intake,
                batch = self.source.next_events() => batch,
            };

            match polled {
                Ok(events) if events.is_empty() => {}
                Ok(events) => {
                    summary.batches += 1;
                    for event in events {
                        self.handle_one(event, &mut summary).await;
                    }
                }
                Err(err) => {
                    summary.poll_failures += 1;
                    warn!(error = %err, "event poll failed");
                    tokio::select! {
                        biased;
                        () = shutdown.cancelled() => break 'intake,
                        () = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }

            self.handler.housekeeping();
        }

        if let Err(err) = self.source.close().await {
            warn!(error = %err, "failed to close event source");
        }
        info!(
            batches = summary.batches,
            handled = summary.handled,
            panicked = summary.panicked,
            poll_failures = summary.poll_failures,
            "dispatch loop stopped"
        );
        summary
    }

    async fn handle_one(
        &self,
        event: InboundEvent,
        summary: &mut DispatchSummary,
    ) {
        let kind = event.kind();
        let actor = event.actor();
        let handler = Arc::clone(&self.handler);
        let outcome = tokio::spawn(async move { handler.handle(event).await }).await;
        summary.handled += 1;
        if let Err(err) = outcome {
            summary.panicked += 1;
            error!(kind, chat_id = %actor, error = %err, "event handler failed");
        }
    }
}
