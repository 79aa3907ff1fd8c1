//! A logical notification and the chat messages it expands into.

use crate::messaging::domain::{Button, ChatId};
use crate::task::domain::{MediaKind, MediaRef, TaskId};
use std::fmt;

/// Lifecycle event a delivery announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A task was created (and possibly assigned).
    TaskCreated,
    /// The assignee accepted a task.
    TaskAccepted,
    /// The assignee submitted completion evidence.
    EvidenceSubmitted,
    /// The owner approved a task.
    TaskApproved,
}

impl NotificationKind {
    /// Returns the name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskAccepted => "task_accepted",
            Self::EvidenceSubmitted => "evidence_submitted",
            Self::TaskApproved => "task_approved",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of one outbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Plain text with optional buttons.
    Text {
        /// Message text.
        text: String,
        /// Inline buttons, one per row.
        buttons: Vec<Button>,
    },
    /// A media item forwarded by reference.
    Media {
        /// Kind of media.
        kind: MediaKind,
        /// Transport reference to the media.
        reference: MediaRef,
        /// Caption shown under the media.
        caption: Option<String>,
        /// Inline buttons, one per row.
        buttons: Vec<Button>,
    },
}

/// One chat message addressed to a user's chat, if they have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Recipient chat; `None` when the user never linked a chat.
    pub recipient: Option<ChatId>,
    /// Message content.
    pub body: MessageBody,
}

impl OutboundMessage {
    /// Creates a text message.
    #[must_use]
    pub fn text(recipient: Option<ChatId>, text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self {
            recipient,
            body: MessageBody::Text {
                text: text.into(),
                buttons,
            },
        }
    }

    /// Creates a media message.
    #[must_use]
    pub const fn media(
        recipient: Option<ChatId>,
        kind: MediaKind,
        reference: MediaRef,
        caption: Option<String>,
        buttons: Vec<Button>,
    ) -> Self {
        Self {
            recipient,
            body: MessageBody::Media {
                kind,
                reference,
                caption,
                buttons,
            },
        }
    }
}

/// A logical notification: the ordered messages announcing one lifecycle
/// event. Messages are sent in order by a single worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    kind: NotificationKind,
    task_id: TaskId,
    messages: Vec<OutboundMessage>,
}

impl Delivery {
    /// Creates a delivery.
    #[must_use]
    pub const fn new(
        kind: NotificationKind,
        task_id: TaskId,
        messages: Vec<OutboundMessage>,
    ) -> Self {
        Self {
            kind,
            task_id,
            messages,
        }
    }

    /// Returns the announced event.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the task the delivery is about.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the messages in send order.
    #[must_use]
    pub fn messages(&self) -> &[OutboundMessage] {
        &self.messages
    }
}
