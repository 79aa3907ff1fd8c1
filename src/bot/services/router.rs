//! Routes inbound chat events to the lifecycle engine.
//!
//! Button presses are acknowledged before anything else so the client never
//! waits on a spinner. Every failure ends in a chat reply or a log line;
//! nothing propagates out of [`InteractionRouter::route`].

use super::EvidenceContexts;
use crate::bot::domain::{ButtonPayload, ButtonVerb};
use crate::bot::ports::InboundHandler;
use crate::messaging::domain::{Button, CallbackId, ChatId, InboundEvent, MessageRef};
use crate::messaging::ports::MessagingTransport;
use crate::notification::domain::{Delivery, NotificationResult, TaskView, Template};
use crate::notification::services::{NotificationComposer, NotificationDispatcher};
use crate::task::domain::{Evidence, MediaKind, Task, TaskDomainError, TaskId};
use crate::task::ports::TaskRepository;
use crate::task::services::{LifecycleEngine, TaskLifecycleError};
use crate::user::domain::{User, UserId};
use crate::user::ports::UserDirectory;
use async_trait::async_trait;
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const FALLBACK_TEXT: &str = "Something went wrong. Please try again later.";

/// What the router did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A button press moved a task to a new status.
    Transitioned {
        /// Affected task.
        task_id: TaskId,
        /// Verb of the pressed button.
        verb: ButtonVerb,
    },
    /// Content was stored as evidence.
    EvidenceAccepted {
        /// Affected task.
        task_id: TaskId,
    },
    /// The task is absent, the actor is not allowed, or the status does not
    /// permit the action.
    Denied {
        /// Requested task.
        task_id: TaskId,
    },
    /// The button payload could not be decoded.
    InvalidPayload,
    /// Evidence content was empty or unusable.
    InvalidEvidence,
    /// Content arrived while no evidence was expected from the actor.
    Guidance,
    /// The actor's chat is not linked to any user.
    UnknownUser,
    /// A command was answered.
    Replied,
    /// The event needs no reaction.
    Ignored,
    /// Storage or another internal dependency failed.
    Failed,
}

/// Content that may become evidence.
enum Content {
    Text(String),
    Media {
        kind: MediaKind,
        reference: String,
        filename: Option<String>,
    },
}

/// Inbound event router.
pub struct InteractionRouter<R, U, C>
where
    R: TaskRepository + 'static,
    U: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    engine: LifecycleEngine<R, C>,
    directory: Arc<U>,
    transport: Arc<dyn MessagingTransport>,
    composer: Arc<NotificationComposer>,
    dispatcher: Arc<NotificationDispatcher>,
    contexts: EvidenceContexts<C>,
}

impl<R, U, C> InteractionRouter<R, U, C>
where
    R: TaskRepository + 'static,
    U: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a router.
    #[must_use]
    pub const fn new(
        engine: LifecycleEngine<R, C>,
        directory: Arc<U>,
        transport: Arc<dyn MessagingTransport>,
        composer: Arc<NotificationComposer>,
        dispatcher: Arc<NotificationDispatcher>,
        contexts: EvidenceContexts<C>,
    ) -> Self {
        Self {
            engine,
            directory,
            transport,
            composer,
            dispatcher,
            contexts,
        }
    }

    /// Returns the evidence mappings owned by this router.
    #[must_use]
    pub const fn contexts(&self) -> &EvidenceContexts<C> {
        &self.contexts
    }

    /// Handles one inbound event.
    pub async fn route(&self, event: InboundEvent) -> RouteOutcome {
        match event {
            InboundEvent::ButtonPress {
                callback_id,
                actor,
                payload,
                message,
            } => {
                self.on_button(&callback_id, actor, &payload, message)
                    .await
            }
            InboundEvent::Text { actor, text } => self.on_content(actor, Content::Text(text)).await,
            InboundEvent::Media {
                actor,
                kind,
                reference,
                filename,
            } => {
                let content = Content::Media {
                    kind,
                    reference,
                    filename,
                };
                self.on_content(actor, content).await
            }
            InboundEvent::Command { actor, command } => self.on_command(actor, &command).await,
        }
    }

    async fn on_button(
        &self,
        callback_id: &CallbackId,
        actor: ChatId,
        payload: &str,
        message: Option<MessageRef>,
    ) -> RouteOutcome {
        if let Err(err) = self.transport.acknowledge(callback_id).await {
            warn!(chat_id = %actor, error = %err, "failed to acknowledge button press");
        }

        let Ok(decoded) = payload.parse::<ButtonPayload>() else {
            debug!(chat_id = %actor, payload, "undecodable button payload");
            let text = self.render_plain(Template::UnknownAction);
            self.answer(actor, message, &text, &[]).await;
            return RouteOutcome::InvalidPayload;
        };

        let user = match self.resolve(actor).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                let text = self.render(Template::UnknownUser, chat_context(actor));
                self.answer(actor, message, &text, &[]).await;
                return RouteOutcome::UnknownUser;
            }
            Err(()) => {
                let text = self.render_plain(Template::InternalError);
                self.answer(actor, message, &text, &[]).await;
                return RouteOutcome::Failed;
            }
        };

        let task_id = decoded.task_id();
        let verb = decoded.verb();
        match self.apply_verb(verb, task_id, &user).await {
            Ok(task) => {
                let (text, buttons) = self.after_transition(verb, &task, &user).await;
                self.answer(actor, message, &text, &buttons).await;
                info!(task_id = %task_id, verb = verb.as_str(), "button handled");
                RouteOutcome::Transitioned { task_id, verb }
            }
            Err(err) => self.on_failure(actor, message, task_id, &err).await,
        }
    }

    async fn apply_verb(
        &self,
        verb: ButtonVerb,
        task_id: TaskId,
        user: &User,
    ) -> Result<Task, TaskLifecycleError> {
        match verb {
            ButtonVerb::Accept => self.engine.accept(task_id, user.id()).await,
            ButtonVerb::Reject => self.engine.reject(task_id, user.id()).await,
            ButtonVerb::Complete => self.engine.request_completion(task_id, user.id()).await,
            ButtonVerb::Approve => self.engine.approve(task_id, user.id()).await,
        }
    }

    /// Side effects of a successful transition and the text that replaces
    /// the pressed message.
    async fn after_transition(
        &self,
        verb: ButtonVerb,
        task: &Task,
        actor: &User,
    ) -> (String, Vec<Button>) {
        let view = TaskView::new(task);
        match verb {
            ButtonVerb::Accept => {
                let owner = self.lookup(task.owner()).await;
                self.notify(self.composer.task_accepted(task, owner.as_ref(), Some(actor)));
                let complete = ButtonPayload::new(ButtonVerb::Complete, task.id()).button();
                (self.render(Template::AcceptedSummary, &view), vec![complete])
            }
            ButtonVerb::Reject => (self.render(Template::TaskRejected, &view), Vec::new()),
            ButtonVerb::Complete => {
                self.contexts.begin(actor.id(), task.id());
                (self.render(Template::EvidencePrompt, &view), Vec::new())
            }
            ButtonVerb::Approve => {
                let assignee = match task.assignee() {
                    Some(id) => self.lookup(id).await,
                    None => None,
                };
                self.notify(self.composer.task_approved(task, Some(actor), assignee.as_ref()));
                (self.render(Template::TaskApprovedOwner, &view), Vec::new())
            }
        }
    }

    async fn on_failure(
        &self,
        actor: ChatId,
        message: Option<MessageRef>,
        task_id: TaskId,
        err: &TaskLifecycleError,
    ) -> RouteOutcome {
        if let TaskLifecycleError::NotFoundOrUnauthorized(_) = err {
            let text = self.render_plain(Template::ActionFailed);
            self.answer(actor, message, &text, &[]).await;
            return RouteOutcome::Denied { task_id };
        }
        error!(task_id = %task_id, error = %err, "transition failed");
        let text = self.render_plain(Template::InternalError);
        self.answer(actor, message, &text, &[]).await;
        RouteOutcome::Failed
    }

    async fn on_content(&self, actor: ChatId, content: Content) -> RouteOutcome {
        let user = match self.resolve(actor).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                let text = self.render(Template::UnknownUser, chat_context(actor));
                self.reply(actor, &text).await;
                return RouteOutcome::UnknownUser;
            }
            Err(()) => {
                let text = self.render_plain(Template::InternalError);
                self.reply(actor, &text).await;
                return RouteOutcome::Failed;
            }
        };

        let Some(task_id) = self.contexts.pending(user.id()) else {
            let text = self.render_plain(Template::Guidance);
            self.reply(actor, &text).await;
            return RouteOutcome::Guidance;
        };

        let (evidence, filename) = match into_evidence(content) {
            Ok(parts) => parts,
            Err(err) => {
                debug!(chat_id = %actor, error = %err, "rejected evidence content");
                let text = self.render_plain(Template::EvidenceInvalid);
                self.reply(actor, &text).await;
                return RouteOutcome::InvalidEvidence;
            }
        };

        match self.engine.submit_evidence(task_id, user.id(), evidence).await {
            Ok(task) => {
                self.contexts.clear(user.id());
                let owner = self.lookup(task.owner()).await;
                let view = TaskView::new(&task).with_owner(owner.as_ref());
                let text = self.render(Template::EvidenceReceived, &view);
                self.reply(actor, &text).await;
                self.notify(self.composer.evidence_submitted(
                    &task,
                    owner.as_ref(),
                    Some(&user),
                    filename.as_deref(),
                ));
                info!(task_id = %task_id, "evidence submitted");
                RouteOutcome::EvidenceAccepted { task_id }
            }
            Err(TaskLifecycleError::NotFoundOrUnauthorized(_)) => {
                self.contexts.clear(user.id());
                let text = self.render_plain(Template::ActionFailed);
                self.reply(actor, &text).await;
                RouteOutcome::Denied { task_id }
            }
            Err(err) => {
                error!(task_id = %task_id, error = %err, "evidence submission failed");
                let text = self.render_plain(Template::InternalError);
                self.reply(actor, &text).await;
                RouteOutcome::Failed
            }
        }
    }

    async fn on_command(&self, actor: ChatId, command: &str) -> RouteOutcome {
        if command != "start" {
            debug!(chat_id = %actor, command, "ignoring unknown command");
            return RouteOutcome::Ignored;
        }
        let template = match self.resolve(actor).await {
            Ok(Some(_)) => Template::Start,
            Ok(None) => Template::UnknownUser,
            Err(()) => Template::InternalError,
        };
        let text = self.render(template, chat_context(actor));
        self.reply(actor, &text).await;
        RouteOutcome::Replied
    }

    async fn resolve(&self, actor: ChatId) -> Result<Option<User>, ()> {
        self.directory.find_by_chat_id(actor).await.map_err(|err| {
            error!(chat_id = %actor, error = %err, "user lookup failed");
        })
    }

    async fn lookup(&self, id: UserId) -> Option<User> {
        match self.directory.find_by_id(id).await {
            Ok(user) => user,
            Err(err) => {
                warn!(user_id = %id, error = %err, "user lookup failed");
                None
            }
        }
    }

    fn notify(&self, composed: NotificationResult<Delivery>) {
        match composed {
            Ok(delivery) => self.dispatcher.dispatch(delivery),
            Err(err) => warn!(error = %err, "failed to compose notification"),
        }
    }

    fn render(&self, template: Template, context: impl Serialize) -> String {
        self.composer
            .templates()
            .render(template, context)
            .unwrap_or_else(|err| {
                warn!(error = %err, "template rendering failed");
                FALLBACK_TEXT.to_owned()
            })
    }

    fn render_plain(&self, template: Template) -> String {
        self.render(template, minijinja::context! {})
    }

    /// Edits the pressed message, or sends a new one when the transport did
    /// not report which message carried the button.
    async fn answer(
        &self,
        actor: ChatId,
        message: Option<MessageRef>,
        text: &str,
        buttons: &[Button],
    ) {
        let result = match message {
            Some(target) => self.transport.edit_message(target, text, buttons).await,
            None => self
                .transport
                .send_text(actor, text, buttons)
                .await
                .map(|_| ()),
        };
        if let Err(err) = result {
            warn!(chat_id = %actor, error = %err, "failed to answer button press");
        }
    }

    async fn reply(&self, actor: ChatId, text: &str) {
        if let Err(err) = self.transport.send_text(actor, text, &[]).await {
            warn!(chat_id = %actor, error = %err, "failed to send reply");
        }
    }
}

fn chat_context(actor: ChatId) -> minijinja::Value {
    minijinja::context! { chat_id => actor.value() }
}

fn into_evidence(content: Content) -> Result<(Evidence, Option<String>), TaskDomainError> {
    match content {
        Content::Text(text) => Ok((Evidence::text(text)?, None)),
        Content::Media {
            kind,
            reference,
            filename,
        } => Ok((Evidence::media(kind, reference)?, filename)),
    }
}

#[async_trait]
impl<R, U, C> InboundHandler for InteractionRouter<R, U, C>
where
    R: TaskRepository + 'static,
    U: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    async fn handle(&self, event: InboundEvent) {
        let kind = event.kind();
        let actor = event.actor();
        let outcome = self.route(event).await;
        debug!(kind, chat_id = %actor, ?outcome, "inbound event routed");
    }

    fn housekeeping(&self) {
        let purged = self.contexts.purge_expired();
        if purged > 0 {
            debug!(purged, "expired evidence contexts evicted");
        }
    }
}
