//! Lifecycle engine: the single entry point for status transitions.

use crate::task::{
    domain::{Evidence, Task, TaskDomainError, TaskId, Transition, TransitionCommand},
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::user::domain::UserId;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// The task does not exist, the actor lacks the required role, or the
    /// task's status does not permit the transition. The cases are not
    /// distinguished so callers cannot discover other users' tasks.
    #[error("task {0} not found or action not permitted")]
    NotFoundOrUnauthorized(TaskId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Applies lifecycle transitions through the repository's atomic
/// read-check-write.
#[derive(Clone)]
pub struct LifecycleEngine<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> LifecycleEngine<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle engine.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Assignee accepts a new task (NEW to WORK).
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFoundOrUnauthorized`] when the task is
    /// absent, the actor is not the assignee or the task is not NEW.
    pub async fn accept(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<Task> {
        self.transition(task_id, actor, Transition::Accept).await
    }

    /// Owner withdraws a task that is NEW or in WORK.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFoundOrUnauthorized`] when the task is
    /// absent, the actor is not the owner or the task is past WORK.
    pub async fn reject(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<Task> {
        self.transition(task_id, actor, Transition::Reject).await
    }

    /// Assignee declares the work finished (WORK to REVIEW).
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFoundOrUnauthorized`] when the task is
    /// absent, the actor is not the assignee or the task is not in WORK.
    pub async fn request_completion(
        &self,
        task_id: TaskId,
        actor: UserId,
    ) -> TaskLifecycleResult<Task> {
        self.transition(task_id, actor, Transition::RequestCompletion)
            .await
    }

    /// Assignee attaches evidence to a task under review.
    ///
    /// Resubmission while still under review replaces the earlier evidence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFoundOrUnauthorized`] when the task is
    /// absent, the actor is not the assignee or the task is not in REVIEW.
    pub async fn submit_evidence(
        &self,
        task_id: TaskId,
        actor: UserId,
        evidence: Evidence,
    ) -> TaskLifecycleResult<Task> {
        let command =
            TransitionCommand::submit_evidence(task_id, actor, evidence, self.clock.utc());
        self.execute(command).await
    }

    /// Owner approves a task under review (REVIEW to DONE).
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFoundOrUnauthorized`] when the task is
    /// absent, the actor is not the owner or the task is not in REVIEW.
    pub async fn approve(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<Task> {
        self.transition(task_id, actor, Transition::Approve).await
    }

    async fn transition(
        &self,
        task_id: TaskId,
        actor: UserId,
        transition: Transition,
    ) -> TaskLifecycleResult<Task> {
        let command = TransitionCommand::new(task_id, actor, transition, self.clock.utc())?;
        self.execute(command).await
    }

    async fn execute(&self, command: TransitionCommand) -> TaskLifecycleResult<Task> {
        let Some(task) = self.repository.apply_transition(&command).await? else {
            debug!(
                task_id = %command.task_id(),
                actor = %command.actor(),
                transition = %command.transition(),
                "transition denied"
            );
            return Err(TaskLifecycleError::NotFoundOrUnauthorized(command.task_id()));
        };
        info!(
            task_id = %task.id(),
            transition = %command.transition(),
            status = %task.status(),
            "task transitioned"
        );
        Ok(task)
    }
}
