//! Repository port for registered users.

use crate::messaging::domain::ChatId;
use crate::user::domain::{Email, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// User persistence and lookup contract.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Stores a newly registered user.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::DuplicateEmail`] when the email is
    /// already registered or [`UserDirectoryError::DuplicateChat`] when the
    /// chat is linked to another user.
    async fn store(&self, user: &User) -> UserDirectoryResult<()>;

    /// Persists profile changes and the chat link of an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when the user does not exist
    /// or [`UserDirectoryError::DuplicateChat`] when the chat is linked to
    /// another user.
    async fn update(&self, user: &User) -> UserDirectoryResult<()>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<User>>;

    /// Finds the user whose private chat is `chat_id`.
    async fn find_by_chat_id(&self, chat_id: ChatId) -> UserDirectoryResult<Option<User>>;

    /// Finds a user by email address.
    async fn find_by_email(&self, email: &Email) -> UserDirectoryResult<Option<User>>;

    /// Removes a user. Returns `false` when the user did not exist.
    async fn remove(&self, id: UserId) -> UserDirectoryResult<bool>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// The email address is already registered.
    #[error("email already registered: {0}")]
    DuplicateEmail(Email),

    /// The chat is already linked to another user.
    #[error("chat {0} is already linked to another user")]
    DuplicateChat(ChatId),

    /// The user was not found.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
