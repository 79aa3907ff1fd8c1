//! Domain model for bot users.
//!
//! A user is addressed internally by [`UserId`] and, once they have talked to
//! the bot, externally by the chat identifier of their private chat.

mod error;
mod user;

pub use error::UserDomainError;
pub use user::{DisplayName, Email, PersistedUserData, User, UserId};
