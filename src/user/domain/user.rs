//! User identity and profile.

use super::UserDomainError;
use crate::messaging::domain::ChatId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Internal user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Email address used as the unique login of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validates and normalises an email address to lower case.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::InvalidEmail`] when the value is empty or
    /// has no local part or domain around a single `@`.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let valid = normalized
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            });
        if !valid {
            return Err(UserDomainError::InvalidEmail(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name shown to other users in chat messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Maximum length in characters.
    pub const MAX_CHARS: usize = 100;

    /// Validates a display name.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyDisplayName`] or
    /// [`UserDomainError::DisplayNameTooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let trimmed = value.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(UserDomainError::EmptyDisplayName);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_CHARS {
            return Err(UserDomainError::DisplayNameTooLong {
                length,
                max: Self::MAX_CHARS,
            });
        }
        Ok(Self(trimmed))
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: Email,
    display_name: DisplayName,
    chat_id: Option<ChatId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted identifier.
    pub id: UserId,
    /// Persisted email address.
    pub email: Email,
    /// Persisted display name.
    pub display_name: DisplayName,
    /// Linked chat, if any.
    pub chat_id: Option<ChatId>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Registers a new user without a linked chat.
    #[must_use]
    pub fn new(email: Email, display_name: DisplayName, clock: &impl Clock) -> Self {
        Self {
            id: UserId::new(),
            email,
            display_name,
            chat_id: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a user from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            email: data.email,
            display_name: data.display_name,
            chat_id: data.chat_id,
            created_at: data.created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Returns the linked chat, if the user has started the bot.
    #[must_use]
    pub const fn chat_id(&self) -> Option<ChatId> {
        self.chat_id
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Links or unlinks the user's private chat.
    pub const fn link_chat(&mut self, chat_id: Option<ChatId>) {
        self.chat_id = chat_id;
    }

    /// Replaces the display name.
    pub fn rename(&mut self, display_name: DisplayName) {
        self.display_name = display_name;
    }
}
