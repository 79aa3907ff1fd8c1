//! Validation errors for user domain values.

use thiserror::Error;

/// Errors raised while constructing user values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserDomainError {
    /// The email address is empty or lacks an `@`.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// The display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// The display name exceeds the allowed length.
    #[error("display name is {length} characters, maximum is {max}")]
    DisplayNameTooLong {
        /// Observed length in characters.
        length: usize,
        /// Allowed maximum.
        max: usize,
    },
}
