//! Bounded worker pool delivering notifications through the chat transport.
//!
//! Deliveries go through fixed-capacity queues, one per worker, so
//! notification volume never turns into unbounded concurrent sends. Every
//! failure is logged and counted; none is returned to the code that queued
//! the delivery.

use crate::messaging::domain::ChatId;
use crate::messaging::ports::{MessagingTransport, TransportResult};
use crate::notification::domain::{Delivery, MessageBody, NotificationKind, OutboundMessage};
use crate::task::domain::TaskId;
use std::fmt;
use std::future::Future;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Sizing of the notification worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Number of concurrent send workers.
    pub workers: usize,
    /// Deliveries that may wait, split evenly across the worker queues.
    pub queue_capacity: usize,
    /// Upper bound on a single transport call.
    pub send_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
            send_timeout: Duration::from_secs(10),
        }
    }
}

/// Counters exposed for operators and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Deliveries taken off the queue.
    pub deliveries: u64,
    /// Messages the transport accepted.
    pub sent: u64,
    /// Messages that failed or timed out.
    pub failed: u64,
    /// Messages skipped because the recipient has no chat.
    pub skipped: u64,
    /// Deliveries refused because the queue was full or closed.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    deliveries: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DispatcherStats {
        DispatcherStats {
            deliveries: self.deliveries.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Composition that finishes on a worker, right before sending.
type Compose = Pin<Box<dyn Future<Output = Option<Delivery>> + Send>>;

/// Unit of work waiting in a shard queue.
enum Job {
    Ready(Delivery),
    Deferred {
        kind: NotificationKind,
        task_id: TaskId,
        compose: Compose,
    },
}

impl Job {
    const fn kind(&self) -> NotificationKind {
        match self {
            Self::Ready(delivery) => delivery.kind(),
            Self::Deferred { kind, .. } => *kind,
        }
    }

    const fn task_id(&self) -> TaskId {
        match self {
            Self::Ready(delivery) => delivery.task_id(),
            Self::Deferred { task_id, .. } => *task_id,
        }
    }
}

/// Fire-and-forget notification dispatcher.
///
/// Every task id maps to one worker through its own queue, so deliveries
/// for the same task are sent in the order they were queued while
/// different tasks proceed in parallel.
///
/// Must be started inside a Tokio runtime. Call
/// [`shutdown`](Self::shutdown) to finish queued work before exit.
pub struct NotificationDispatcher {
    shards: Vec<mpsc::Sender<Job>>,
    workers: TaskTracker,
    cancel: CancellationToken,
    counters: Arc<Counters>,
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("shards", &self.shards.len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl NotificationDispatcher {
    /// Starts the worker pool over `transport`.
    ///
    /// The queue capacity is split evenly across the workers.
    #[must_use]
    pub fn start(transport: Arc<dyn MessagingTransport>, config: DispatcherConfig) -> Self {
        let worker_count = config.workers.max(1);
        let per_shard = config.queue_capacity.max(1).div_ceil(worker_count);
        let workers = TaskTracker::new();
        let cancel = CancellationToken::new();
        let counters = Arc::new(Counters::default());

        let shards = (0..worker_count)
            .map(|worker_id| {
                let (sender, queue) = mpsc::channel(per_shard);
                workers.spawn(run_worker(Worker {
                    id: worker_id,
                    queue,
                    transport: Arc::clone(&transport),
                    counters: Arc::clone(&counters),
                    send_timeout: config.send_timeout,
                    cancel: cancel.clone(),
                }));
                sender
            })
            .collect();
        info!(
            workers = worker_count,
            queue_per_worker = per_shard,
            "notification dispatcher started"
        );

        Self {
            shards,
            workers,
            cancel,
            counters,
        }
    }

    /// Queues a delivery without waiting.
    ///
    /// A full queue drops the delivery with a warning; the caller is never
    /// blocked or failed.
    pub fn dispatch(&self, delivery: Delivery) {
        self.submit(Job::Ready(delivery));
    }

    /// Reserves a place in the task's queue now and composes the delivery
    /// later, on the worker, right before it is sent.
    ///
    /// Lets callers that must not wait (such as task creation) keep their
    /// notification ahead of later ones for the same task. A `compose`
    /// future that yields `None` is skipped.
    pub fn defer<F>(&self, kind: NotificationKind, task_id: TaskId, compose: F)
    where
        F: Future<Output = Option<Delivery>> + Send + 'static,
    {
        self.submit(Job::Deferred {
            kind,
            task_id,
            compose: Box::pin(compose),
        });
    }

    fn shard_for(&self, task_id: TaskId) -> Option<&mpsc::Sender<Job>> {
        let mut hasher = DefaultHasher::new();
        task_id.hash(&mut hasher);
        let count = u64::try_from(self.shards.len()).ok()?;
        let index = usize::try_from(hasher.finish().checked_rem(count)?).ok()?;
        self.shards.get(index)
    }

    fn submit(&self, job: Job) {
        let kind = job.kind();
        let task_id = job.task_id();
        let Some(shard) = self.shard_for(task_id) else {
            Counters::bump(&self.counters.dropped);
            warn!(%kind, %task_id, "no notification worker, delivery dropped");
            return;
        };
        let reason = match shard.try_send(job) {
            Ok(()) => return,
            Err(mpsc::error::TrySendError::Full(_)) => "notification queue full, delivery dropped",
            Err(mpsc::error::TrySendError::Closed(_)) => {
                "notification queue closed, delivery dropped"
            }
        };
        Counters::bump(&self.counters.dropped);
        warn!(%kind, %task_id, "{reason}");
    }

    /// Returns a snapshot of the delivery counters.
    #[must_use]
    pub fn stats(&self) -> DispatcherStats {
        self.counters.snapshot()
    }

    /// Drains every queue, then stops the workers.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.workers.close();
        self.workers.wait().await;
        let stats = self.stats();
        info!(
            deliveries = stats.deliveries,
            sent = stats.sent,
            failed = stats.failed,
            skipped = stats.skipped,
            dropped = stats.dropped,
            "notification dispatcher stopped"
        );
    }
}

struct Worker {
    id: usize,
    queue: mpsc::Receiver<Job>,
    transport: Arc<dyn MessagingTransport>,
    counters: Arc<Counters>,
    send_timeout: Duration,
    cancel: CancellationToken,
}

async fn run_worker(mut worker: Worker) {
    loop {
        // Queued work wins over cancellation so shutdown drains the queue.
        let next = tokio::select! {
            biased;
            job = worker.queue.recv() => job,
            () = worker.cancel.cancelled() => worker.queue.try_recv().ok(),
        };
        let Some(job) = next else {
            break;
        };
        let delivery = match job {
            Job::Ready(delivery) => delivery,
            Job::Deferred {
                kind,
                task_id,
                compose,
            } => match tokio::time::timeout(worker.send_timeout, compose).await {
                Ok(Some(delivery)) => delivery,
                Ok(None) => continue,
                Err(_elapsed) => {
                    Counters::bump(&worker.counters.failed);
                    warn!(%kind, %task_id, "notification composition timed out");
                    continue;
                }
            },
        };
        Counters::bump(&worker.counters.deliveries);
        for message in delivery.messages() {
            deliver(&worker, &delivery, message).await;
        }
    }
    debug!(worker = worker.id, "notification worker stopped");
}

async fn deliver(worker: &Worker, delivery: &Delivery, message: &OutboundMessage) {
    let Some(chat_id) = message.recipient else {
        Counters::bump(&worker.counters.skipped);
        debug!(
            kind = %delivery.kind(),
            task_id = %delivery.task_id(),
            "recipient has no linked chat, message skipped"
        );
        return;
    };

    let attempt = send(&*worker.transport, chat_id, message);
    match tokio::time::timeout(worker.send_timeout, attempt).await {
        Ok(Ok(())) => Counters::bump(&worker.counters.sent),
        Ok(Err(err)) => {
            Counters::bump(&worker.counters.failed);
            warn!(
                kind = %delivery.kind(),
                task_id = %delivery.task_id(),
                chat_id = %chat_id,
                error = %err,
                "notification send failed"
            );
        }
        Err(_elapsed) => {
            Counters::bump(&worker.counters.failed);
            warn!(
                kind = %delivery.kind(),
                task_id = %delivery.task_id(),
                chat_id = %chat_id,
                "notification send timed out"
            );
        }
    }
}

async fn send(
    transport: &dyn MessagingTransport,
    chat_id: ChatId,
    message: &OutboundMessage,
) -> TransportResult<()> {
    match &message.body {
        MessageBody::Text { text, buttons } => {
            transport.send_text(chat_id, text, buttons).await?;
        }
        MessageBody::Media {
            kind,
            reference,
            caption,
            buttons,
        } => {
            transport
                .send_media(chat_id, *kind, reference, caption.as_deref(), buttons)
                .await?;
        }
    }
    Ok(())
}
