//! Bot API wire types and their conversion into inbound events.

use serde::{Deserialize, Serialize};

use crate::messaging::domain::{Button, CallbackId, ChatId, InboundEvent, MessageId, MessageRef};
use crate::task::domain::MediaKind;

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
}

/// Inline keyboard markup, one button per row.
#[derive(Debug, Serialize)]
pub(super) struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    callback_data: String,
}

impl InlineKeyboardMarkup {
    /// Builds markup for `buttons`, or `None` when there are none.
    pub fn from_buttons(buttons: &[Button]) -> Option<Self> {
        if buttons.is_empty() {
            return None;
        }
        let inline_keyboard = buttons
            .iter()
            .map(|button| {
                vec![InlineKeyboardButton {
                    text: button.label().to_owned(),
                    callback_data: button.payload().to_owned(),
                }]
            })
            .collect();
        Some(Self { inline_keyboard })
    }

    /// Markup that removes every button from an edited message.
    pub const fn empty() -> Self {
        Self {
            inline_keyboard: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
    pub video: Option<FileRef>,
    pub document: Option<Document>,
}

impl Message {
    pub const fn message_ref(&self) -> MessageRef {
        MessageRef::new(ChatId::new(self.chat.id), MessageId::new(self.message_id))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct User {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileRef {
    pub file_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

impl Update {
    /// Converts an update into an inbound event.
    ///
    /// Returns `None` for updates the bot does not react to (edited
    /// messages, stickers, button presses without data and so on).
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            return query.into_event();
        }
        self.message.and_then(Message::into_event)
    }
}

impl CallbackQuery {
    fn into_event(self) -> Option<InboundEvent> {
        let payload = self.data?;
        Some(InboundEvent::ButtonPress {
            callback_id: CallbackId::new(self.id),
            actor: ChatId::new(self.from.id),
            payload,
            message: self.message.as_ref().map(Message::message_ref),
        })
    }
}

impl Message {
    fn into_event(self) -> Option<InboundEvent> {
        let actor = ChatId::new(self.from.as_ref().map_or(self.chat.id, |user| user.id));

        // The largest rendition is the most useful one to forward.
        if let Some(photo) = self.photo.and_then(|sizes| {
            sizes
                .into_iter()
                .max_by_key(|size| u64::from(size.width) * u64::from(size.height))
        }) {
            return Some(InboundEvent::Media {
                actor,
                kind: MediaKind::Photo,
                reference: photo.file_id,
                filename: None,
            });
        }
        if let Some(video) = self.video {
            return Some(InboundEvent::Media {
                actor,
                kind: MediaKind::Video,
                reference: video.file_id,
                filename: None,
            });
        }
        if let Some(document) = self.document {
            return Some(InboundEvent::Media {
                actor,
                kind: MediaKind::Document,
                reference: document.file_id,
                filename: document.file_name,
            });
        }

        let text = self.text?;
        if let Some(command) = text.strip_prefix('/') {
            let name = command
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .split('@')
                .next()
                .unwrap_or_default();
            return Some(InboundEvent::Command {
                actor,
                command: name.to_ascii_lowercase(),
            });
        }
        Some(InboundEvent::Text { actor, text })
    }
}
