//! User directory behaviour on `PostgreSQL`.

use crate::postgres::helpers::{ASSIGNEE_CHAT, BoxError, OWNER_CHAT, PgContext, pg_context, user};
use rstest::rstest;
use taskbot::{
    messaging::domain::ChatId,
    user::ports::{UserDirectory, UserDirectoryError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn users_are_found_by_chat_and_email(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };

    let by_chat = ctx.users.find_by_chat_id(ChatId::new(ASSIGNEE_CHAT)).await?;
    let by_email = ctx.users.find_by_email(ctx.owner.email()).await?;

    assert_eq!(by_chat.map(|found| found.id()), Some(ctx.assignee.id()));
    assert_eq!(by_email.map(|found| found.id()), Some(ctx.owner.id()));
    assert!(ctx.users.find_by_chat_id(ChatId::new(999)).await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_chat_links_to_one_user_only(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };
    let newcomer = user("Nadia", Some(OWNER_CHAT))?;

    let stored = ctx.users.store(&newcomer).await;
    assert!(matches!(
        stored,
        Err(UserDirectoryError::DuplicateChat(chat)) if chat == ChatId::new(OWNER_CHAT)
    ));

    let mut relinked = ctx.assignee.clone();
    relinked.link_chat(Some(ChatId::new(OWNER_CHAT)));
    let updated = ctx.users.update(&relinked).await;
    assert!(matches!(updated, Err(UserDirectoryError::DuplicateChat(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_email_is_rejected(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };
    let twin = user("Olga", None)?;

    let stored = ctx.users.store(&twin).await;

    assert!(matches!(stored, Err(UserDirectoryError::DuplicateEmail(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn relinking_moves_the_chat(
    #[future(awt)] pg_context: Result<Option<PgContext>, BoxError>,
) -> Result<(), BoxError> {
    let Some(ctx) = pg_context? else {
        return Ok(());
    };
    let mut moved = ctx.assignee.clone();
    moved.link_chat(Some(ChatId::new(300)));

    ctx.users.update(&moved).await?;

    assert!(ctx.users.find_by_chat_id(ChatId::new(ASSIGNEE_CHAT)).await?.is_none());
    let found = ctx.users.find_by_chat_id(ChatId::new(300)).await?;
    assert_eq!(found.map(|user| user.id()), Some(ctx.assignee.id()));
    Ok(())
}
