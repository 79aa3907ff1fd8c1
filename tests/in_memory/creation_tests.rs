//! Task creation must not wait for, or fail because of, notification delivery.

use std::time::{Duration, Instant};

use crate::in_memory::helpers::{ASSIGNEE_CHAT, Harness, OWNER_CHAT};
use taskbot::{
    messaging::{adapters::memory::InMemoryTransport, domain::ChatId},
    task::{domain::TaskStatus, ports::TaskRepository},
};

#[tokio::test(flavor = "multi_thread")]
async fn creation_returns_before_a_slow_transport_delivers() -> Result<(), eyre::Report> {
    let transport = InMemoryTransport::new().with_delay(Duration::from_millis(400));
    let harness = Harness::with_transport(transport).await?;

    let started = Instant::now();
    let task_id = harness.create_task("Book the meeting room").await?;
    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(harness.transport.calls()?.is_empty());

    harness.dispatcher.shutdown().await;
    assert_eq!(harness.transport.sent_to(ChatId::new(OWNER_CHAT))?.len(), 1);
    assert_eq!(harness.transport.sent_to(ChatId::new(ASSIGNEE_CHAT))?.len(), 1);
    assert!(harness.repository.find_by_id(task_id).await?.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn creation_succeeds_when_every_send_fails() -> Result<(), eyre::Report> {
    let transport = InMemoryTransport::new();
    transport.fail_chat(ChatId::new(OWNER_CHAT))?;
    transport.fail_chat(ChatId::new(ASSIGNEE_CHAT))?;
    let harness = Harness::with_transport(transport).await?;

    let task_id = harness.create_task("Order new chairs").await?;
    harness.dispatcher.shutdown().await;

    let stored = harness
        .repository
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    assert_eq!(stored.status(), TaskStatus::New);
    assert_eq!(harness.dispatcher.stats().failed, 2);
    Ok(())
}
