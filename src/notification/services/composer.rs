//! Builds the deliveries announcing lifecycle events.

use crate::bot::domain::{ButtonPayload, ButtonVerb};
use crate::messaging::domain::Button;
use crate::notification::domain::{
    Delivery, MessageTemplates, NotificationKind, NotificationResult, OutboundMessage, TaskView,
    Template,
};
use crate::task::domain::Task;
use crate::user::domain::User;
use std::sync::Arc;

/// Composes notification deliveries from tasks and the users involved.
///
/// Users are passed as `Option` because a party may have been removed; a
/// missing user or a user without a linked chat yields a message with no
/// recipient, which the dispatcher skips.
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    templates: Arc<MessageTemplates>,
}

fn button(verb: ButtonVerb, task: &Task) -> Button {
    ButtonPayload::new(verb, task.id()).button()
}

impl NotificationComposer {
    /// Creates a composer over compiled templates.
    #[must_use]
    pub const fn new(templates: Arc<MessageTemplates>) -> Self {
        Self { templates }
    }

    /// Returns the templates for direct replies.
    #[must_use]
    pub fn templates(&self) -> &MessageTemplates {
        &self.templates
    }

    /// Initial messages for a new task: the assignee copy with accept and
    /// reject buttons (when assigned) followed by the owner summary.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`](crate::notification::domain::NotificationError)
    /// when rendering fails.
    pub fn task_created(
        &self,
        task: &Task,
        owner: Option<&User>,
        assignee: Option<&User>,
    ) -> NotificationResult<Delivery> {
        let view = TaskView::new(task)
            .with_owner(owner)
            .with_assignee(assignee);
        let mut messages = Vec::with_capacity(2);
        if task.assignee().is_some() {
            messages.push(OutboundMessage::text(
                assignee.and_then(User::chat_id),
                self.templates.render(Template::TaskAssigned, &view)?,
                vec![button(ButtonVerb::Accept, task), button(ButtonVerb::Reject, task)],
            ));
        }
        messages.push(OutboundMessage::text(
            owner.and_then(User::chat_id),
            self.templates.render(Template::TaskCreated, &view)?,
            vec![button(ButtonVerb::Reject, task)],
        ));
        Ok(Delivery::new(NotificationKind::TaskCreated, task.id(), messages))
    }

    /// Owner notice that the assignee accepted.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`](crate::notification::domain::NotificationError)
    /// when rendering fails.
    pub fn task_accepted(
        &self,
        task: &Task,
        owner: Option<&User>,
        assignee: Option<&User>,
    ) -> NotificationResult<Delivery> {
        let view = TaskView::new(task)
            .with_owner(owner)
            .with_assignee(assignee);
        let message = OutboundMessage::text(
            owner.and_then(User::chat_id),
            self.templates.render(Template::TaskAccepted, &view)?,
            Vec::new(),
        );
        Ok(Delivery::new(
            NotificationKind::TaskAccepted,
            task.id(),
            vec![message],
        ))
    }

    /// Owner summary of the submitted evidence with an approve button.
    ///
    /// Text evidence goes in the summary itself. Media evidence is forwarded
    /// as a second message whose caption carries the document file name, if
    /// any, followed by a text prompt holding the approve button. The button
    /// never sits on the media message because its text cannot be edited.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`](crate::notification::domain::NotificationError)
    /// when rendering fails.
    pub fn evidence_submitted(
        &self,
        task: &Task,
        owner: Option<&User>,
        assignee: Option<&User>,
        filename: Option<&str>,
    ) -> NotificationResult<Delivery> {
        let recipient = owner.and_then(User::chat_id);
        let view = TaskView::new(task)
            .with_owner(owner)
            .with_assignee(assignee)
            .with_filename(filename);
        let summary = self.templates.render(Template::EvidenceSubmitted, &view)?;
        let approve = vec![button(ButtonVerb::Approve, task)];

        let media = task.evidence().and_then(|evidence| evidence.media_item());
        let messages = match media {
            Some((reference, kind)) => vec![
                OutboundMessage::text(recipient, summary, Vec::new()),
                OutboundMessage::media(
                    recipient,
                    kind,
                    reference.clone(),
                    Some(self.templates.render(Template::EvidenceCaption, &view)?),
                    Vec::new(),
                ),
                OutboundMessage::text(
                    recipient,
                    self.templates.render(Template::ApprovalPrompt, &view)?,
                    approve,
                ),
            ],
            None => vec![OutboundMessage::text(recipient, summary, approve)],
        };
        Ok(Delivery::new(
            NotificationKind::EvidenceSubmitted,
            task.id(),
            messages,
        ))
    }

    /// Assignee notice that the owner approved.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`](crate::notification::domain::NotificationError)
    /// when rendering fails.
    pub fn task_approved(
        &self,
        task: &Task,
        owner: Option<&User>,
        assignee: Option<&User>,
    ) -> NotificationResult<Delivery> {
        let view = TaskView::new(task)
            .with_owner(owner)
            .with_assignee(assignee);
        let message = OutboundMessage::text(
            assignee.and_then(User::chat_id),
            self.templates.render(Template::TaskApprovedAssignee, &view)?,
            Vec::new(),
        );
        Ok(Delivery::new(
            NotificationKind::TaskApproved,
            task.id(),
            vec![message],
        ))
    }
}
