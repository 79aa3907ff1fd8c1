//! Button payload codec: `"<verb>:<task id>"`.

use crate::messaging::domain::Button;
use crate::task::domain::TaskId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Action carried by an inline button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonVerb {
    /// Assignee accepts a new task.
    Accept,
    /// Owner rejects a task.
    Reject,
    /// Assignee requests completion.
    Complete,
    /// Owner approves evidence.
    Approve,
}

impl ButtonVerb {
    /// All verbs.
    pub const ALL: [Self; 4] = [Self::Accept, Self::Reject, Self::Complete, Self::Approve];

    /// Returns the wire form of the verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Complete => "complete",
            Self::Approve => "approve",
        }
    }

    /// Returns the button label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accept => "Accept",
            Self::Reject => "Reject",
            Self::Complete => "Complete",
            Self::Approve => "Approve",
        }
    }
}

impl TryFrom<&str> for ButtonVerb {
    type Error = ButtonPayloadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "complete" => Ok(Self::Complete),
            "approve" => Ok(Self::Approve),
            other => Err(ButtonPayloadError::UnknownVerb(other.to_owned())),
        }
    }
}

/// Errors raised while decoding a button payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ButtonPayloadError {
    /// The payload has no `:` separator.
    #[error("malformed button payload: {0:?}")]
    Malformed(String),

    /// The verb is not one of the known actions.
    #[error("unknown button verb: {0:?}")]
    UnknownVerb(String),

    /// The task identifier is not a valid UUID.
    #[error("invalid task id in button payload: {0:?}")]
    InvalidTaskId(String),
}

/// Decoded button payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonPayload {
    verb: ButtonVerb,
    task_id: TaskId,
}

impl ButtonPayload {
    /// Creates a payload.
    #[must_use]
    pub const fn new(verb: ButtonVerb, task_id: TaskId) -> Self {
        Self { verb, task_id }
    }

    /// Returns the verb.
    #[must_use]
    pub const fn verb(&self) -> ButtonVerb {
        self.verb
    }

    /// Returns the target task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Builds the inline button carrying this payload.
    #[must_use]
    pub fn button(&self) -> Button {
        Button::new(self.verb.label(), self.to_string())
    }
}

impl fmt::Display for ButtonPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.verb.as_str(), self.task_id)
    }
}

impl FromStr for ButtonPayload {
    type Err = ButtonPayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (raw_verb, id) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ButtonPayloadError::Malformed(s.to_owned()))?;
        let verb = ButtonVerb::try_from(raw_verb)?;
        let task_id = id
            .parse::<TaskId>()
            .map_err(|_| ButtonPayloadError::InvalidTaskId(id.to_owned()))?;
        Ok(Self { verb, task_id })
    }
}
