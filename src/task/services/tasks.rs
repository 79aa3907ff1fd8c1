//! Owner-facing task management: create, read, edit, delete.

use super::{TaskLifecycleError, TaskLifecycleResult};
use crate::task::{
    domain::{NewTaskParams, Task, TaskDescription, TaskId, TaskName, TaskStatus},
    ports::{TaskCreatedHook, TaskFilter, TaskRepository},
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    owner: UserId,
    name: String,
    description: String,
    assignee: Option<UserId>,
    end_date: DateTime<Utc>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(owner: UserId, name: impl Into<String>, end_date: DateTime<Utc>) -> Self {
        Self {
            owner,
            name: name.into(),
            description: String::new(),
            assignee: None,
            end_date,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Assigns the task to `assignee`.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }
}

/// Owner edits to an existing task. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    name: Option<String>,
    description: Option<String>,
    assignee: Option<Option<UserId>>,
    end_date: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the task.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets (`Some`) or clears (`None`) the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Moves the deadline.
    #[must_use]
    pub const fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

/// Task management service scoped to the owning user.
///
/// Every read and write checks that the acting user owns the task; other
/// users receive [`TaskLifecycleError::NotFoundOrUnauthorized`] exactly as if
/// the task did not exist.
#[derive(Clone)]
pub struct TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    creation_hook: Option<Arc<dyn TaskCreatedHook>>,
}

impl<R, C> TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service without a creation hook.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            creation_hook: None,
        }
    }

    /// Installs the hook invoked after each task is stored.
    #[must_use]
    pub fn with_creation_hook(mut self, hook: Arc<dyn TaskCreatedHook>) -> Self {
        self.creation_hook = Some(hook);
        self
    }

    /// Creates a task in NEW and runs the creation hook.
    ///
    /// The hook is invoked after the task is stored and must not block, so
    /// the call returns independently of notification delivery.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for invalid fields or a
    /// deadline before now, and [`TaskLifecycleError::Repository`] when the
    /// store rejects the write.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let CreateTaskRequest {
            owner,
            name,
            description,
            assignee,
            end_date,
        } = request;
        let params = NewTaskParams {
            name: TaskName::new(name)?,
            description: TaskDescription::new(description)?,
            owner,
            assignee,
            end_date,
        };
        let task = Task::new(params, &*self.clock)?;
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), owner = %owner, "task created");

        if let Some(hook) = &self.creation_hook {
            hook.on_task_created(&task);
        }
        Ok(task)
    }

    /// Returns a task owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFoundOrUnauthorized`] when the task
    /// does not exist or belongs to someone else.
    pub async fn get(&self, actor: UserId, id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|task| task.owner() == actor)
            .ok_or(TaskLifecycleError::NotFoundOrUnauthorized(id))
    }

    /// Lists tasks owned by `actor`, oldest first, optionally narrowed by
    /// status and assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the query fails.
    pub async fn list(
        &self,
        actor: UserId,
        status: Option<TaskStatus>,
        assignee: Option<UserId>,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let filter = TaskFilter {
            owner: Some(actor),
            assignee,
            status,
        };
        Ok(self.repository.query(&filter).await?)
    }

    /// Applies owner edits.
    ///
    /// Edits are validated as a whole; nothing is written if any field is
    /// invalid.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFoundOrUnauthorized`] for tasks the
    /// actor does not own and [`TaskLifecycleError::Domain`] for invalid
    /// fields, including a deadline before the creation time.
    pub async fn update(
        &self,
        actor: UserId,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.get(actor, id).await?;
        let clock = &*self.clock;

        let new_name = request.name.map(TaskName::new).transpose()?;
        let new_description = request.description.map(TaskDescription::new).transpose()?;
        if let Some(end_date) = request.end_date {
            task.reschedule(end_date, clock)?;
        }
        if let Some(name) = new_name {
            task.rename(name, clock);
        }
        if let Some(description) = new_description {
            task.describe(description, clock);
        }
        if let Some(assignee) = request.assignee {
            task.assign(assignee, clock);
        }

        self.repository.update_details(&task).await?;
        info!(task_id = %id, "task updated");
        Ok(task)
    }

    /// Deletes a task together with its evidence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFoundOrUnauthorized`] for tasks the
    /// actor does not own.
    pub async fn delete(&self, actor: UserId, id: TaskId) -> TaskLifecycleResult<()> {
        self.get(actor, id).await?;
        if !self.repository.delete(id).await? {
            return Err(TaskLifecycleError::NotFoundOrUnauthorized(id));
        }
        info!(task_id = %id, "task deleted");
        Ok(())
    }
}
