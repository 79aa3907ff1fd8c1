//! In-memory transport that records every outbound call.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::messaging::{
    domain::{Button, CallbackId, ChatId, MessageId, MessageRef},
    ports::{MessagingTransport, TransportError, TransportResult},
};
use crate::task::domain::{MediaKind, MediaRef};

/// Outbound call captured by [`InMemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// A text message was sent.
    Text {
        /// Reference assigned to the sent message.
        message: MessageRef,
        /// Message text.
        text: String,
        /// Attached buttons.
        buttons: Vec<Button>,
    },
    /// A media item was sent.
    Media {
        /// Reference assigned to the sent message.
        message: MessageRef,
        /// Media kind.
        kind: MediaKind,
        /// Media reference.
        reference: String,
        /// Optional caption.
        caption: Option<String>,
        /// Attached buttons.
        buttons: Vec<Button>,
    },
    /// An existing message was edited.
    Edit {
        /// Edited message.
        message: MessageRef,
        /// Replacement text.
        text: String,
        /// Replacement buttons.
        buttons: Vec<Button>,
    },
    /// A button press was acknowledged.
    Acknowledge {
        /// Acknowledged callback.
        callback_id: CallbackId,
    },
}

impl TransportCall {
    /// Returns the chat a sent or edited message belongs to.
    #[must_use]
    pub const fn chat_id(&self) -> Option<ChatId> {
        match self {
            Self::Text { message, .. } | Self::Media { message, .. } | Self::Edit { message, .. } => {
                Some(message.chat_id)
            }
            Self::Acknowledge { .. } => None,
        }
    }

    /// Returns the text or caption carried by the call.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } | Self::Edit { text, .. } => Some(text),
            Self::Media { caption, .. } => caption.as_deref(),
            Self::Acknowledge { .. } => None,
        }
    }

    /// Returns the buttons carried by the call.
    #[must_use]
    pub fn buttons(&self) -> &[Button] {
        match self {
            Self::Text { buttons, .. } | Self::Media { buttons, .. } | Self::Edit { buttons, .. } => {
                buttons
            }
            Self::Acknowledge { .. } => &[],
        }
    }

    /// Returns whether the call delivered a new message.
    #[must_use]
    pub const fn is_send(&self) -> bool {
        matches!(self, Self::Text { .. } | Self::Media { .. })
    }
}

/// Thread-safe recording transport for tests and local runs.
///
/// Sends to chats registered with [`InMemoryTransport::fail_chat`] return a
/// [`TransportError::Rejected`] and are not recorded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<RwLock<InMemoryTransportState>>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    calls: Vec<TransportCall>,
    next_message_id: i64,
    failing_chats: HashSet<ChatId>,
}

impl InMemoryTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every outbound call by `delay` to model a slow network.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every send and edit addressed to `chat_id` fail.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn fail_chat(&self, chat_id: ChatId) -> TransportResult<()> {
        self.write()?.failing_chats.insert(chat_id);
        Ok(())
    }

    /// Returns all recorded calls in order.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn calls(&self) -> TransportResult<Vec<TransportCall>> {
        Ok(self.read()?.calls.clone())
    }

    /// Returns recorded sends (not edits or acknowledgements) to `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn sent_to(&self, chat_id: ChatId) -> TransportResult<Vec<TransportCall>> {
        Ok(self
            .read()?
            .calls
            .iter()
            .filter(|call| call.is_send() && call.chat_id() == Some(chat_id))
            .cloned()
            .collect())
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn read(&self) -> TransportResult<std::sync::RwLockReadGuard<'_, InMemoryTransportState>> {
        self.state
            .read()
            .map_err(|err| TransportError::connection(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> TransportResult<std::sync::RwLockWriteGuard<'_, InMemoryTransportState>> {
        self.state
            .write()
            .map_err(|err| TransportError::connection(std::io::Error::other(err.to_string())))
    }

    fn record_send(
        &self,
        chat_id: ChatId,
        build: impl FnOnce(MessageRef) -> TransportCall,
    ) -> TransportResult<MessageRef> {
        let mut state = self.write()?;
        if state.failing_chats.contains(&chat_id) {
            return Err(rejected(chat_id));
        }
        state.next_message_id += 1;
        let message = MessageRef::new(chat_id, MessageId::new(state.next_message_id));
        state.calls.push(build(message));
        Ok(message)
    }
}

fn rejected(chat_id: ChatId) -> TransportError {
    TransportError::Rejected {
        code: 400,
        description: format!("chat {chat_id} not found"),
    }
}

#[async_trait]
impl MessagingTransport for InMemoryTransport {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> TransportResult<MessageRef> {
        self.pause().await;
        self.record_send(chat_id, |message| TransportCall::Text {
            message,
            text: text.to_owned(),
            buttons: buttons.to_vec(),
        })
    }

    async fn send_media(
        &self,
        chat_id: ChatId,
        kind: MediaKind,
        reference: &MediaRef,
        caption: Option<&str>,
        buttons: &[Button],
    ) -> TransportResult<MessageRef> {
        self.pause().await;
        self.record_send(chat_id, |message| TransportCall::Media {
            message,
            kind,
            reference: reference.as_str().to_owned(),
            caption: caption.map(str::to_owned),
            buttons: buttons.to_vec(),
        })
    }

    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        buttons: &[Button],
    ) -> TransportResult<()> {
        self.pause().await;
        let mut state = self.write()?;
        if state.failing_chats.contains(&message.chat_id) {
            return Err(rejected(message.chat_id));
        }
        state.calls.push(TransportCall::Edit {
            message,
            text: text.to_owned(),
            buttons: buttons.to_vec(),
        });
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &CallbackId) -> TransportResult<()> {
        self.pause().await;
        self.write()?.calls.push(TransportCall::Acknowledge {
            callback_id: callback_id.clone(),
        });
        Ok(())
    }
}
