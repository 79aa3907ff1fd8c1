//! Telegram Bot API adapter for the messaging ports.
//!
//! Outbound calls are JSON `POST`s to `{api_url}/bot{token}/{method}` with a
//! per-request timeout and a single retry on connection failures or
//! timeouts. Inbound events come from `getUpdates` long polling; the adapter
//! tracks the update offset so each event is delivered once.

mod wire;


use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::messaging::{
    domain::{Button, CallbackId, ChatId, InboundEvent, MessageRef},
    ports::{EventSource, MessagingTransport, TransportError, TransportResult},
};
use crate::task::domain::{MediaKind, MediaRef};
use wire::{ApiResponse, InlineKeyboardMarkup, Message, Update};

/// Connection settings for [`TelegramTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub token: String,
    /// API base URL without trailing slash.
    pub api_url: String,
    /// Timeout for a single outbound request.
    pub request_timeout: Duration,
    /// Long-poll window for `getUpdates`.
    pub poll_timeout: Duration,
}

/// Telegram Bot API client implementing both messaging ports.
#[derive(Debug)]
pub struct TelegramTransport {
    client: reqwest::Client,
    config: TelegramConfig,
    offset: AtomicI64,
}

impl TelegramTransport {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] when the HTTP client cannot be
    /// built (for example when no TLS backend is available).
    pub fn new(config: TelegramConfig) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(TransportError::connection)?;
        Ok(Self {
            client,
            config,
            offset: AtomicI64::new(0),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.config.api_url.trim_end_matches('/'),
            self.config.token
        )
    }

    async fn call_once<B, T>(&self, method: &str, body: &B, timeout: Duration) -> TransportResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let envelope = response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|err| TransportError::Malformed(err.to_string()))?;
        if !envelope.ok {
            return Err(TransportError::Rejected {
                code: envelope.error_code.unwrap_or_default(),
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Malformed(format!("{method} returned no result")))
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> TransportResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let timeout = self.config.request_timeout;
        match self.call_once(method, body, timeout).await {
            Err(err) if err.is_transient() => {
                debug!(method, error = %err, "retrying telegram request once");
                self.call_once(method, body, timeout).await
            }
            other => other,
        }
    }

    async fn fetch_updates(&self, poll: Duration) -> TransportResult<Vec<Update>> {
        let body = json!({
            "offset": self.offset.load(Ordering::SeqCst),
            "timeout": poll.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        let timeout = poll + self.config.request_timeout;
        self.call_once("getUpdates", &body, timeout).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::connection(err)
    }
}

fn with_markup(mut body: Value, markup: Option<InlineKeyboardMarkup>) -> Value {
    if let (Some(fields), Some(keyboard)) = (body.as_object_mut(), markup) {
        fields.insert("reply_markup".to_owned(), json!(keyboard));
    }
    body
}

const fn media_method(kind: MediaKind) -> (&'static str, &'static str) {
    match kind {
        MediaKind::Photo => ("sendPhoto", "photo"),
        MediaKind::Video => ("sendVideo", "video"),
        MediaKind::Document => ("sendDocument", "document"),
    }
}

#[async_trait]
impl MessagingTransport for TelegramTransport {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> TransportResult<MessageRef> {
        let body = with_markup(
            json!({ "chat_id": chat_id.value(), "text": text }),
            InlineKeyboardMarkup::from_buttons(buttons),
        );
        let sent: Message = self.call("sendMessage", &body).await?;
        Ok(sent.message_ref())
    }

    async fn send_media(
        &self,
        chat_id: ChatId,
        kind: MediaKind,
        reference: &MediaRef,
        caption: Option<&str>,
        buttons: &[Button],
    ) -> TransportResult<MessageRef> {
        let (method, field) = media_method(kind);
        let mut body = with_markup(
            json!({ "chat_id": chat_id.value() }),
            InlineKeyboardMarkup::from_buttons(buttons),
        );
        if let Some(fields) = body.as_object_mut() {
            fields.insert(field.to_owned(), json!(reference.as_str()));
            if let Some(text) = caption {
                fields.insert("caption".to_owned(), json!(text));
            }
        }
        let sent: Message = self.call(method, &body).await?;
        Ok(sent.message_ref())
    }

    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        buttons: &[Button],
    ) -> TransportResult<()> {
        let markup =
            InlineKeyboardMarkup::from_buttons(buttons).unwrap_or_else(InlineKeyboardMarkup::empty);
        let body = with_markup(
            json!({
                "chat_id": message.chat_id.value(),
                "message_id": message.message_id.value(),
                "text": text,
            }),
            Some(markup),
        );
        // editMessageText returns either the message or `true`.
        let _edited: Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &CallbackId) -> TransportResult<()> {
        let body = json!({ "callback_query_id": callback_id.as_str() });
        let _acknowledged: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }
}

#[async_trait]
impl EventSource for TelegramTransport {
    async fn next_events(&self) -> TransportResult<Vec<InboundEvent>> {
        let updates = self.fetch_updates(self.config.poll_timeout).await?;
        let mut events = Vec::with_capacity(updates.len());
        for update in updates {
            self.offset
                .fetch_max(update.update_id.saturating_add(1), Ordering::SeqCst);
            let update_id = update.update_id;
            match update.into_event() {
                Some(event) => events.push(event),
                None => debug!(update_id, "ignoring unsupported telegram update"),
            }
        }
        Ok(events)
    }

    async fn close(&self) -> TransportResult<()> {
        // A zero-timeout poll confirms the last offset so handled updates are
        // not redelivered after a restart.
        if let Err(err) = self.fetch_updates(Duration::ZERO).await {
            warn!(error = %err, "failed to confirm telegram update offset on shutdown");
            return Err(err);
        }
        Ok(())
    }
}
