//! Error types for task domain validation and parsing.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing or editing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyName,

    /// The task name exceeds the storage limit.
    #[error("task name is {length} characters long, limit is {max}")]
    NameTooLong {
        /// Observed length in characters.
        length: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// The task description exceeds the storage limit.
    #[error("task description is {length} characters long, limit is {max}")]
    DescriptionTooLong {
        /// Observed length in characters.
        length: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// The deadline precedes the task creation time.
    #[error("end date {end_date} is earlier than creation time {created_at}")]
    EndDateBeforeCreation {
        /// Requested deadline.
        end_date: DateTime<Utc>,
        /// Task creation timestamp.
        created_at: DateTime<Utc>,
    },

    /// Completion evidence text is empty after trimming.
    #[error("completion evidence must not be empty")]
    EmptyEvidence,

    /// A media reference is empty after trimming.
    #[error("media reference must not be empty")]
    EmptyMediaReference,

    /// An evidence submission was requested without evidence.
    #[error("evidence submission requires evidence")]
    MissingEvidence,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing media kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown media kind: {0}")]
pub struct ParseMediaKindError(pub String);
