//! Inbound events delivered by the chat transport.

use super::{CallbackId, ChatId, MessageRef};
use crate::task::domain::MediaKind;

/// Event pulled from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// An inline button was pressed.
    ButtonPress {
        /// Identifier used to acknowledge the press.
        callback_id: CallbackId,
        /// Chat identity of the user who pressed the button.
        actor: ChatId,
        /// Payload stored on the button.
        payload: String,
        /// Message carrying the button, when the transport reports it.
        message: Option<MessageRef>,
    },
    /// A plain text message.
    Text {
        /// Chat identity of the sender.
        actor: ChatId,
        /// Message text.
        text: String,
    },
    /// A photo, video or document upload.
    Media {
        /// Chat identity of the sender.
        actor: ChatId,
        /// Kind of the uploaded media.
        kind: MediaKind,
        /// Transport-side reference to the upload.
        reference: String,
        /// Original file name for documents.
        filename: Option<String>,
    },
    /// A slash command such as `/start`.
    Command {
        /// Chat identity of the sender.
        actor: ChatId,
        /// Command name without the leading slash.
        command: String,
    },
}

impl InboundEvent {
    /// Returns the chat identity of the user who caused the event.
    #[must_use]
    pub const fn actor(&self) -> ChatId {
        match self {
            Self::ButtonPress { actor, .. }
            | Self::Text { actor, .. }
            | Self::Media { actor, .. }
            | Self::Command { actor, .. } => *actor,
        }
    }

    /// Returns a short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ButtonPress { .. } => "button_press",
            Self::Text { .. } => "text",
            Self::Media { .. } => "media",
            Self::Command { .. } => "command",
        }
    }
}
