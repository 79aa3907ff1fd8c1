//! Task aggregate root and lifecycle status.

use super::{
    Evidence, ParseTaskStatusError, TaskDescription, TaskDomainError, TaskId, TaskName,
    TransitionCommand,
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created and waits for the assignee.
    New,
    /// The assignee accepted the task and is working on it.
    Work,
    /// Completion was requested; evidence is pending or awaiting approval.
    Review,
    /// The owner approved the submitted evidence.
    Done,
    /// The owner withdrew the task.
    Rejected,
}

impl TaskStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Work,
        Self::Review,
        Self::Done,
        Self::Rejected,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Work => "work",
            Self::Review => "review",
            Self::Done => "done",
            Self::Rejected => "rejected",
        }
    }

    /// Returns a human-readable label for chat messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Work => "In progress",
            Self::Review => "Under review",
            Self::Done => "Done",
            Self::Rejected => "Rejected",
        }
    }

    /// Returns whether no further transition may leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Rejected)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "new" => Ok(Self::New),
            "work" => Ok(Self::Work),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskParams {
    /// Validated task name.
    pub name: TaskName,
    /// Validated description.
    pub description: TaskDescription,
    /// Creating user.
    pub owner: UserId,
    /// Optional assignee.
    pub assignee: Option<UserId>,
    /// Deadline; must not precede the creation time.
    pub end_date: DateTime<Utc>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: TaskName,
    description: TaskDescription,
    status: TaskStatus,
    owner: UserId,
    assignee: Option<UserId>,
    end_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    evidence: Option<Evidence>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted name.
    pub name: TaskName,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted assignee, if any.
    pub assignee: Option<UserId>,
    /// Persisted deadline.
    pub end_date: DateTime<Utc>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted evidence submission timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted evidence.
    pub evidence: Option<Evidence>,
}

impl Task {
    /// Creates a new task in [`TaskStatus::New`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EndDateBeforeCreation`] when the deadline
    /// precedes the creation time read from `clock`.
    pub fn new(params: NewTaskParams, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let timestamp = clock.utc();
        ensure_end_date(params.end_date, timestamp)?;
        Ok(Self {
            id: TaskId::new(),
            name: params.name,
            description: params.description,
            status: TaskStatus::New,
            owner: params.owner,
            assignee: params.assignee,
            end_date: params.end_date,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
            evidence: None,
        })
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EndDateBeforeCreation`] when the stored
    /// deadline violates the creation-time invariant.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        ensure_end_date(data.end_date, data.created_at)?;
        Ok(Self {
            id: data.id,
            name: data.name,
            description: data.description,
            status: data.status,
            owner: data.owner,
            assignee: data.assignee,
            end_date: data.end_date,
            created_at: data.created_at,
            updated_at: data.updated_at,
            completed_at: data.completed_at,
            evidence: data.evidence,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the task description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns when evidence was last submitted.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the submitted evidence, if any.
    #[must_use]
    pub const fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    /// Renames the task.
    pub fn rename(&mut self, name: TaskName, clock: &impl Clock) {
        self.name = name;
        self.touch(clock);
    }

    /// Replaces the description.
    pub fn describe(&mut self, description: TaskDescription, clock: &impl Clock) {
        self.description = description;
        self.touch(clock);
    }

    /// Sets or clears the assignee.
    pub fn assign(&mut self, assignee: Option<UserId>, clock: &impl Clock) {
        self.assignee = assignee;
        self.touch(clock);
    }

    /// Moves the deadline.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EndDateBeforeCreation`] when the new
    /// deadline precedes the creation time. The task is left unchanged.
    pub fn reschedule(
        &mut self,
        end_date: DateTime<Utc>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        ensure_end_date(end_date, self.created_at)?;
        self.end_date = end_date;
        self.touch(clock);
        Ok(())
    }

    /// Applies the effect of an authorized transition.
    ///
    /// Callers must have checked the command with
    /// [`authorize`](super::authorize) against this task's current state;
    /// repository adapters do so inside their atomic section.
    pub fn apply(&mut self, command: &TransitionCommand) {
        self.status = command.transition().target_status();
        if let Some(evidence) = command.evidence() {
            self.evidence = Some(evidence.clone());
            self.completed_at = Some(command.at());
        }
        self.updated_at = command.at();
    }

    /// Copies the owner-editable fields of `edited` onto this task, keeping
    /// the lifecycle fields as they are.
    pub(crate) fn merge_details(&mut self, edited: &Self) {
        self.name = edited.name.clone();
        self.description = edited.description.clone();
        self.assignee = edited.assignee;
        self.end_date = edited.end_date;
        self.updated_at = edited.updated_at;
    }

    /// Clears the assignee without touching the modification time; used when
    /// the assigned user is removed.
    pub(crate) const fn unassign(&mut self) {
        self.assignee = None;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn ensure_end_date(
    end_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
) -> Result<(), TaskDomainError> {
    if end_date < created_at {
        return Err(TaskDomainError::EndDateBeforeCreation {
            end_date,
            created_at,
        });
    }
    Ok(())
}
