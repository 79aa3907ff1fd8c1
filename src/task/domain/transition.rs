//! Lifecycle transitions and their authorization rules.
//!
//! Every transition names exactly one acting role and the set of statuses it
//! may start from. [`authorize`] is the single place those rules are
//! evaluated; repository adapters call it (or express the same predicate in
//! SQL) inside their atomic read-check-write.

use super::{Evidence, Task, TaskDomainError, TaskId, TaskStatus};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Assignee takes the task on.
    Accept,
    /// Owner withdraws the task.
    Reject,
    /// Assignee declares the work finished and will submit evidence.
    RequestCompletion,
    /// Assignee attaches completion evidence.
    SubmitEvidence,
    /// Owner approves the evidence.
    Approve,
}

/// Party allowed to perform a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRole {
    /// The user who created the task.
    Owner,
    /// The user the task is assigned to.
    Assignee,
}

/// Result of evaluating a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// The actor may perform the transition from the task's current status.
    Allow,
    /// The actor holds the wrong role or the task is in the wrong status.
    Deny,
}

impl Authorization {
    /// Returns `true` for [`Authorization::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl Transition {
    /// All transitions.
    pub const ALL: [Self; 5] = [
        Self::Accept,
        Self::Reject,
        Self::RequestCompletion,
        Self::SubmitEvidence,
        Self::Approve,
    ];

    /// Returns the role allowed to perform this transition.
    #[must_use]
    pub const fn actor_role(self) -> ActorRole {
        match self {
            Self::Accept | Self::RequestCompletion | Self::SubmitEvidence => ActorRole::Assignee,
            Self::Reject | Self::Approve => ActorRole::Owner,
        }
    }

    /// Returns the statuses this transition may start from.
    #[must_use]
    pub const fn source_statuses(self) -> &'static [TaskStatus] {
        match self {
            Self::Accept => &[TaskStatus::New],
            Self::Reject => &[TaskStatus::New, TaskStatus::Work],
            Self::RequestCompletion => &[TaskStatus::Work],
            Self::SubmitEvidence | Self::Approve => &[TaskStatus::Review],
        }
    }

    /// Returns the status the task holds after this transition.
    #[must_use]
    pub const fn target_status(self) -> TaskStatus {
        match self {
            Self::Accept => TaskStatus::Work,
            Self::Reject => TaskStatus::Rejected,
            Self::RequestCompletion | Self::SubmitEvidence => TaskStatus::Review,
            Self::Approve => TaskStatus::Done,
        }
    }

    /// Returns the canonical name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::RequestCompletion => "request_completion",
            Self::SubmitEvidence => "submit_evidence",
            Self::Approve => "approve",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether `actor` may perform `transition` on `task`.
///
/// Pure: no I/O and no side effects.
#[must_use]
pub fn authorize(task: &Task, actor: UserId, transition: Transition) -> Authorization {
    let holds_role = match transition.actor_role() {
        ActorRole::Owner => task.owner() == actor,
        ActorRole::Assignee => task.assignee() == Some(actor),
    };
    let in_source_status = transition.source_statuses().contains(&task.status());
    if holds_role && in_source_status {
        Authorization::Allow
    } else {
        Authorization::Deny
    }
}

/// A fully specified transition request handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommand {
    task_id: TaskId,
    actor: UserId,
    transition: Transition,
    evidence: Option<Evidence>,
    at: DateTime<Utc>,
}

impl TransitionCommand {
    /// Creates a command for any transition other than evidence submission.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingEvidence`] for
    /// [`Transition::SubmitEvidence`]; use
    /// [`TransitionCommand::submit_evidence`] instead.
    pub fn new(
        task_id: TaskId,
        actor: UserId,
        transition: Transition,
        at: DateTime<Utc>,
    ) -> Result<Self, TaskDomainError> {
        if transition == Transition::SubmitEvidence {
            return Err(TaskDomainError::MissingEvidence);
        }
        Ok(Self {
            task_id,
            actor,
            transition,
            evidence: None,
            at,
        })
    }

    /// Creates an evidence submission command.
    #[must_use]
    pub const fn submit_evidence(
        task_id: TaskId,
        actor: UserId,
        evidence: Evidence,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            actor,
            transition: Transition::SubmitEvidence,
            evidence: Some(evidence),
            at,
        }
    }

    /// Returns the target task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns the requested transition.
    #[must_use]
    pub const fn transition(&self) -> Transition {
        self.transition
    }

    /// Returns the submitted evidence for evidence submissions.
    #[must_use]
    pub const fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    /// Returns the time the transition takes effect.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Evaluates this command against the current state of `task`.
    #[must_use]
    pub fn authorize(&self, task: &Task) -> Authorization {
        if task.id() != self.task_id {
            return Authorization::Deny;
        }
        authorize(task, self.actor, self.transition)
    }
}
