//! When steps for task protocol BDD scenarios.

use super::world::{TaskProtocolWorld, run_async};
use rstest_bdd_macros::when;
use taskbot::{
    bot::domain::{ButtonPayload, ButtonVerb},
    messaging::domain::{CallbackId, InboundEvent, MessageId, MessageRef},
    task::domain::MediaKind,
};

fn deliver(world: &mut TaskProtocolWorld, event: InboundEvent) {
    let outcome = run_async(world.router.route(event));
    world.last_outcome = Some(outcome);
}

#[when(r#""{name}" presses "{verb}""#)]
fn presses(world: &mut TaskProtocolWorld, name: String, verb: String) -> Result<(), eyre::Report> {
    let parsed = ButtonVerb::try_from(verb.as_str())
        .map_err(|err| eyre::eyre!("invalid verb in scenario: {err}"))?;
    let chat = world
        .user(&name)?
        .chat_id()
        .ok_or_else(|| eyre::eyre!("{name} has no linked chat"))?;
    let payload = ButtonPayload::new(parsed, world.current_task()?.id());
    world.presses += 1;
    let event = InboundEvent::ButtonPress {
        callback_id: CallbackId::new(format!("cb-{}", world.presses)),
        actor: chat,
        payload: payload.to_string(),
        message: Some(MessageRef::new(chat, MessageId::new(i64::from(world.presses)))),
    };
    deliver(world, event);
    Ok(())
}

#[when(r#""{name}" sends the text "{text}""#)]
fn sends_text(world: &mut TaskProtocolWorld, name: String, text: String) -> Result<(), eyre::Report> {
    let actor = world
        .user(&name)?
        .chat_id()
        .ok_or_else(|| eyre::eyre!("{name} has no linked chat"))?;
    deliver(world, InboundEvent::Text { actor, text });
    Ok(())
}

#[when(r#""{name}" sends a photo "{reference}""#)]
fn sends_photo(
    world: &mut TaskProtocolWorld,
    name: String,
    reference: String,
) -> Result<(), eyre::Report> {
    let actor = world
        .user(&name)?
        .chat_id()
        .ok_or_else(|| eyre::eyre!("{name} has no linked chat"))?;
    deliver(
        world,
        InboundEvent::Media {
            actor,
            kind: MediaKind::Photo,
            reference,
            filename: None,
        },
    );
    Ok(())
}
