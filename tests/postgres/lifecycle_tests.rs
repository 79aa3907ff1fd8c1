//! Atomic transitions against a real `PostgreSQL` store.

use crate::postgres::helpers::{BoxError, PgContext, pg_context};
use rstest::rstest;
use std::sync::Arc;
use taskbot::{
    task::{
        domain::{Evidence, MediaKind, TaskStatus},
        ports::TaskRepository,
        services::TaskLifecycleError,
    },
    user::domain::UserId,
};

fn is_denied<T>(result: &Result<T, TaskLifecycleError>) -> bool {
    matches!(result, Err(TaskLifecycleError::NotFoundOrUnauthorized(_)))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn actors_without_the_role_are_denied(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };
    let task = ctx.create_task("Book the meeting room").await?;

    assert!(is_denied(&ctx.engine.accept(task.id(), ctx.owner.id()).await));
    assert!(is_denied(&ctx.engine.accept(task.id(), UserId::new()).await));
    assert!(is_denied(&ctx.engine.reject(task.id(), ctx.assignee.id()).await));

    let stored = ctx.tasks.find_by_id(task.id()).await?;
    assert_eq!(stored.map(|found| found.status()), Some(TaskStatus::New));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transitions_from_the_wrong_status_are_denied(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };
    let task = ctx.create_task("Send the invoice").await?;

    assert!(is_denied(&ctx.engine.approve(task.id(), ctx.owner.id()).await));
    assert!(is_denied(
        &ctx.engine
            .request_completion(task.id(), ctx.assignee.id())
            .await
    ));
    let evidence = Evidence::text("Sent yesterday")?;
    assert!(is_denied(
        &ctx.engine
            .submit_evidence(task.id(), ctx.assignee.id(), evidence)
            .await
    ));

    let stored = ctx
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or("task vanished")?;
    assert_eq!(stored.status(), TaskStatus::New);
    assert_eq!(stored.evidence(), None);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_accepts_have_one_winner(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };
    let task_id = ctx.create_task("Renew the lease").await?.id();
    let assignee = ctx.assignee.id();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&ctx.engine);
            tokio::spawn(async move { engine.accept(task_id, assignee).await })
        })
        .collect();
    let mut winners = 0_usize;
    for attempt in attempts {
        match attempt.await? {
            Ok(task) => {
                assert_eq!(task.status(), TaskStatus::Work);
                winners += 1;
            }
            Err(TaskLifecycleError::NotFoundOrUnauthorized(id)) => assert_eq!(id, task_id),
            Err(other) => return Err(other.into()),
        }
    }

    assert_eq!(winners, 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn media_evidence_replaces_earlier_text(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };
    let task_id = ctx.task_in_review("Fix the door hinge").await?;

    ctx.engine
        .submit_evidence(task_id, ctx.assignee.id(), Evidence::text("Tightened it")?)
        .await?;
    let photo = Evidence::media(MediaKind::Photo, "AgACAgIAAxkBAAIB")?;
    ctx.engine
        .submit_evidence(task_id, ctx.assignee.id(), photo.clone())
        .await?;

    let stored = ctx
        .tasks
        .find_by_id(task_id)
        .await?
        .ok_or("task vanished")?;
    assert_eq!(stored.status(), TaskStatus::Review);
    assert_eq!(stored.evidence(), Some(&photo));
    assert_eq!(stored.evidence().and_then(Evidence::proof_text), None);
    assert!(stored.completed_at().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_closes_the_task_once(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };
    let task_id = ctx.task_in_review("Archive the reports").await?;
    ctx.engine
        .submit_evidence(task_id, ctx.assignee.id(), Evidence::text("Boxed and labelled")?)
        .await?;

    let approved = ctx.engine.approve(task_id, ctx.owner.id()).await?;

    assert_eq!(approved.status(), TaskStatus::Done);
    assert_eq!(
        approved.evidence().and_then(Evidence::proof_text),
        Some("Boxed and labelled")
    );
    assert!(is_denied(&ctx.engine.approve(task_id, ctx.owner.id()).await));
    Ok(())
}
