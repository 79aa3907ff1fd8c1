//! End-to-end protocol flow through the router.

use crate::in_memory::helpers::{ASSIGNEE_CHAT, Harness, OWNER_CHAT, press, text};
use taskbot::{
    bot::{domain::ButtonVerb, services::RouteOutcome},
    messaging::{adapters::memory::TransportCall, domain::ChatId},
    notification::domain::NotificationKind,
    task::{
        domain::{Evidence, TaskStatus},
        ports::TaskRepository,
    },
};

/// Maps a sent message back to the notification it belongs to.
///
/// Direct router replies and edits match nothing and are ignored.
fn notice(call: &TransportCall) -> Option<(NotificationKind, ChatId)> {
    if !call.is_send() {
        return None;
    }
    let text = call.text()?;
    let kind = if text.starts_with("New task from") || text.starts_with("Task created") {
        NotificationKind::TaskCreated
    } else if text.starts_with("Ivan accepted the task") {
        NotificationKind::TaskAccepted
    } else if text.starts_with("Ivan submitted evidence for") {
        NotificationKind::EvidenceSubmitted
    } else if text.starts_with("Olga approved your task") {
        NotificationKind::TaskApproved
    } else {
        return None;
    };
    Some((kind, call.chat_id()?))
}

#[tokio::test(flavor = "multi_thread")]
async fn round_trip_notifies_each_party_in_order() -> Result<(), eyre::Report> {
    let harness = Harness::new().await?;
    let task_id = harness.create_task("Replace the toner").await?;

    let accepted = harness
        .router
        .route(press(ASSIGNEE_CHAT, ButtonVerb::Accept, task_id))
        .await;
    assert!(matches!(accepted, RouteOutcome::Transitioned { .. }));
    harness
        .router
        .route(press(ASSIGNEE_CHAT, ButtonVerb::Complete, task_id))
        .await;
    let evidence = harness
        .router
        .route(text(ASSIGNEE_CHAT, "Toner replaced, test page printed"))
        .await;
    assert_eq!(evidence, RouteOutcome::EvidenceAccepted { task_id });
    let approved = harness
        .router
        .route(press(OWNER_CHAT, ButtonVerb::Approve, task_id))
        .await;
    assert_eq!(
        approved,
        RouteOutcome::Transitioned {
            task_id,
            verb: ButtonVerb::Approve
        }
    );

    harness.dispatcher.shutdown().await;

    let stored = harness
        .repository
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    assert_eq!(stored.status(), TaskStatus::Done);
    assert!(stored.completed_at().is_some());

    assert_eq!(
        stored.evidence().and_then(Evidence::proof_text),
        Some("Toner replaced, test page printed")
    );

    let stats = harness.dispatcher.stats();
    assert_eq!(stats.deliveries, 4);
    assert_eq!(stats.failed, 0);

    let owner = ChatId::new(OWNER_CHAT);
    let assignee = ChatId::new(ASSIGNEE_CHAT);
    let notices: Vec<_> = harness.transport.calls()?.iter().filter_map(notice).collect();
    assert_eq!(
        notices,
        vec![
            (NotificationKind::TaskCreated, assignee),
            (NotificationKind::TaskCreated, owner),
            (NotificationKind::TaskAccepted, owner),
            (NotificationKind::EvidenceSubmitted, owner),
            (NotificationKind::TaskApproved, assignee),
        ]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stranger_presses_are_denied_without_side_effects() -> Result<(), eyre::Report> {
    let harness = Harness::new().await?;
    let task_id = harness.create_task("Water the plants").await?;

    let outcome = harness
        .router
        .route(press(OWNER_CHAT, ButtonVerb::Complete, task_id))
        .await;

    assert_eq!(outcome, RouteOutcome::Denied { task_id });
    let stored = harness
        .repository
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    assert_eq!(stored.status(), TaskStatus::New);
    harness.dispatcher.shutdown().await;
    assert_eq!(harness.dispatcher.stats().deliveries, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_approval_sends_no_extra_notification() -> Result<(), eyre::Report> {
    let harness = Harness::new().await?;
    let task_id = harness.create_task("Renew the domain").await?;

    for event in [
        press(ASSIGNEE_CHAT, ButtonVerb::Accept, task_id),
        press(ASSIGNEE_CHAT, ButtonVerb::Complete, task_id),
        text(ASSIGNEE_CHAT, "Renewed until next year"),
        press(OWNER_CHAT, ButtonVerb::Approve, task_id),
    ] {
        harness.router.route(event).await;
    }
    let repeated = harness
        .router
        .route(press(OWNER_CHAT, ButtonVerb::Approve, task_id))
        .await;
    harness.dispatcher.shutdown().await;

    assert_eq!(repeated, RouteOutcome::Denied { task_id });
    assert_eq!(harness.dispatcher.stats().deliveries, 4);
    Ok(())
}
