//! Repository port for task persistence and atomic lifecycle transitions.

use crate::task::domain::{Task, TaskId, TaskStatus, TransitionCommand};
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Criteria for listing tasks. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks created by this user.
    pub owner: Option<UserId>,
    /// Only tasks assigned to this user.
    pub assignee: Option<UserId>,
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Filter matching every task.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            owner: None,
            assignee: None,
            status: None,
        }
    }

    /// Restricts to tasks owned by `owner`.
    #[must_use]
    pub const fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Restricts to tasks assigned to `assignee`.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Restricts to tasks in `status`.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns whether `task` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.owner.is_none_or(|owner| task.owner() == owner)
            && self.assignee.is_none_or(|assignee| task.assignee() == Some(assignee))
            && self.status.is_none_or(|status| task.status() == status)
    }
}

/// Task persistence contract.
///
/// Implementations must make [`TaskRepository::apply_transition`] a single
/// atomic read-check-write: concurrent transitions on the same task are
/// serialised and at most one of several conflicting requests succeeds.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier is
    /// in use or was used by a deleted task.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists owner-editable fields (name, description, assignee, end
    /// date and modification time). Lifecycle fields are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Lists tasks matching `filter`, oldest first.
    async fn query(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>>;

    /// Applies a transition if, at the moment of writing, the actor holds the
    /// required role and the task is in a permitted source status.
    ///
    /// Returns the updated task, or `None` when the task is absent, the actor
    /// is not authorised or the status does not permit the transition.
    async fn apply_transition(
        &self,
        command: &TransitionCommand,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Deletes a task. Returns `false` when it did not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool>;

    /// Clears `user` as assignee on every task. Returns the number of tasks
    /// changed.
    async fn clear_assignee(&self, user: UserId) -> TaskRepositoryResult<usize>;

    /// Deletes every task owned by `user`. Returns the number deleted.
    async fn delete_owned_by(&self, user: UserId) -> TaskRepositoryResult<usize>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier exists or existed.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
