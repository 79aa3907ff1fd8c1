//! Events pulled from an event source reach the router in order.

use std::sync::Arc;
use std::time::Duration;

use crate::in_memory::helpers::{ASSIGNEE_CHAT, Harness, press, text};
use taskbot::{
    bot::{domain::ButtonVerb, services::DispatchLoop},
    messaging::adapters::memory::InMemoryEventSource,
    task::{domain::TaskStatus, ports::TaskRepository},
};
use tokio_util::sync::CancellationToken;

#[tokio::test(flavor = "multi_thread")]
async fn queued_batches_drive_a_task_to_review() -> Result<(), eyre::Report> {
    let harness = Harness::new().await?;
    let task_id = harness.create_task("Clean the whiteboard").await?;

    let source = Arc::new(InMemoryEventSource::new());
    source
        .push_batch(vec![
            press(ASSIGNEE_CHAT, ButtonVerb::Accept, task_id),
            press(ASSIGNEE_CHAT, ButtonVerb::Complete, task_id),
        ])
        .await;
    source
        .push_batch(vec![text(ASSIGNEE_CHAT, "Whiteboard is spotless")])
        .await;

    let shutdown = CancellationToken::new();
    let running = tokio::spawn(
        DispatchLoop::new(Arc::clone(&source), Arc::clone(&harness.router))
            .with_retry_delay(Duration::from_millis(5))
            .run(shutdown.clone()),
    );
    while source.pending().await > 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();
    let summary = running.await?;
    harness.dispatcher.shutdown().await;

    assert_eq!(summary.batches, 2);
    assert_eq!(summary.handled, 3);
    assert_eq!(summary.panicked, 0);
    assert!(source.is_closed());

    let stored = harness
        .repository
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    assert_eq!(stored.status(), TaskStatus::Review);
    assert_eq!(
        stored.evidence().and_then(|evidence| evidence.proof_text()),
        Some("Whiteboard is spotless")
    );
    Ok(())
}
