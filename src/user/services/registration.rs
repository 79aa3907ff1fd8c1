//! User registration, chat linking and removal.

use crate::messaging::domain::ChatId;
use crate::task::ports::{TaskRepository, TaskRepositoryError};
use crate::user::{
    domain::{DisplayName, Email, User, UserDomainError, UserId},
    ports::{UserDirectory, UserDirectoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for user operations.
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),

    /// The user directory rejected the operation.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),

    /// Task cleanup failed while removing a user.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),

    /// The user does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),
}

/// Result type for user service operations.
pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// User management service.
#[derive(Clone)]
pub struct UserService<U, R, C>
where
    U: UserDirectory,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    directory: Arc<U>,
    tasks: Arc<R>,
    clock: Arc<C>,
}

impl<U, R, C> UserService<U, R, C>
where
    U: UserDirectory,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a user service.
    #[must_use]
    pub const fn new(directory: Arc<U>, tasks: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            directory,
            tasks,
            clock,
        }
    }

    /// Registers a user without a linked chat.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Domain`] for an invalid email or name and
    /// [`UserServiceError::Directory`] when the email is already taken.
    pub async fn register(
        &self,
        email: impl Into<String> + Send,
        display_name: impl Into<String> + Send,
    ) -> UserServiceResult<User> {
        let user = User::new(
            Email::new(email)?,
            DisplayName::new(display_name)?,
            &*self.clock,
        );
        self.directory.store(&user).await?;
        info!(user_id = %user.id(), "user registered");
        Ok(user)
    }

    /// Links the user's private chat so the bot can reach them.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::NotFound`] for an unknown user and
    /// [`UserServiceError::Directory`] when the chat belongs to someone else.
    pub async fn link_chat(&self, id: UserId, chat_id: ChatId) -> UserServiceResult<User> {
        let mut user = self
            .directory
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound(id))?;
        user.link_chat(Some(chat_id));
        self.directory.update(&user).await?;
        info!(user_id = %id, chat_id = %chat_id, "chat linked");
        Ok(user)
    }

    /// Finds a user by email address.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Domain`] for a malformed address.
    pub async fn find_by_email(&self, email: &str) -> UserServiceResult<Option<User>> {
        let address = Email::new(email)?;
        Ok(self.directory.find_by_email(&address).await?)
    }

    /// Removes a user.
    ///
    /// The user is cleared as assignee on every task and the tasks they own
    /// are deleted before the directory entry goes away.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::NotFound`] for an unknown user.
    pub async fn remove(&self, id: UserId) -> UserServiceResult<()> {
        if self.directory.find_by_id(id).await?.is_none() {
            return Err(UserServiceError::NotFound(id));
        }
        let unassigned = self.tasks.clear_assignee(id).await?;
        let deleted = self.tasks.delete_owned_by(id).await?;
        self.directory.remove(id).await?;
        info!(user_id = %id, unassigned, deleted, "user removed");
        Ok(())
    }
}
