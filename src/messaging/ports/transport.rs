//! Outbound chat transport port.

use crate::messaging::domain::{Button, CallbackId, ChatId, MessageRef};
use crate::task::domain::{MediaKind, MediaRef};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Outbound messaging capability.
///
/// Implementations own their own request timeout and retry policy; callers
/// treat every call as a single bounded attempt.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Sends a text message, optionally with one button per row.
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> TransportResult<MessageRef>;

    /// Sends a previously uploaded photo, video or document by reference.
    async fn send_media(
        &self,
        chat_id: ChatId,
        kind: MediaKind,
        reference: &MediaRef,
        caption: Option<&str>,
        buttons: &[Button],
    ) -> TransportResult<MessageRef>;

    /// Replaces the text and buttons of an existing message.
    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        buttons: &[Button],
    ) -> TransportResult<()>;

    /// Acknowledges a button press so the client stops waiting.
    async fn acknowledge(&self, callback_id: &CallbackId) -> TransportResult<()>;
}

/// Errors returned by transport adapters.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The remote API refused the request.
    #[error("transport rejected request ({code}): {description}")]
    Rejected {
        /// API error code.
        code: i64,
        /// API error description.
        description: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("transport request timed out")]
    Timeout,

    /// The response could not be decoded.
    #[error("malformed transport response: {0}")]
    Malformed(String),

    /// Connection-level failure.
    #[error("transport connection error: {0}")]
    Connection(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps a connection-level error.
    pub fn connection(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Connection(Arc::new(err))
    }

    /// Returns whether a single retry may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_))
    }
}
