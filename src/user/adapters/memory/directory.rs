//! Thread-safe in-memory user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::messaging::domain::ChatId;
use crate::user::{
    domain::{Email, User, UserId},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};

/// In-memory user directory with email and chat indexes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: HashMap<UserId, User>,
    email_index: HashMap<Email, UserId>,
    chat_index: HashMap<ChatId, UserId>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> UserDirectoryError {
    UserDirectoryError::persistence(std::io::Error::other(err.to_string()))
}

fn ensure_chat_free(state: &InMemoryUserState, user: &User) -> UserDirectoryResult<()> {
    if let Some(chat_id) = user.chat_id()
        && state
            .chat_index
            .get(&chat_id)
            .is_some_and(|owner| *owner != user.id())
    {
        return Err(UserDirectoryError::DuplicateChat(chat_id));
    }
    Ok(())
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn store(&self, user: &User) -> UserDirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.users.contains_key(&user.id()) {
            return Err(UserDirectoryError::DuplicateUser(user.id()));
        }
        if state.email_index.contains_key(user.email()) {
            return Err(UserDirectoryError::DuplicateEmail(user.email().clone()));
        }
        ensure_chat_free(&state, user)?;

        state.email_index.insert(user.email().clone(), user.id());
        if let Some(chat_id) = user.chat_id() {
            state.chat_index.insert(chat_id, user.id());
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> UserDirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let previous_chat = state
            .users
            .get(&user.id())
            .ok_or(UserDirectoryError::NotFound(user.id()))?
            .chat_id();
        ensure_chat_free(&state, user)?;

        if let Some(chat_id) = previous_chat {
            state.chat_index.remove(&chat_id);
        }
        if let Some(chat_id) = user.chat_id() {
            state.chat_index.insert(chat_id, user.id());
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<User>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_chat_id(&self, chat_id: ChatId) -> UserDirectoryResult<Option<User>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .chat_index
            .get(&chat_id)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> UserDirectoryResult<Option<User>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn remove(&self, id: UserId) -> UserDirectoryResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        let Some(user) = state.users.remove(&id) else {
            return Ok(false);
        };
        state.email_index.remove(user.email());
        if let Some(chat_id) = user.chat_id() {
            state.chat_index.remove(&chat_id);
        }
        Ok(true)
    }
}
