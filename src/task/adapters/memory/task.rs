//! In-memory repository for task lifecycle storage.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskId, TransitionCommand},
    ports::{TaskFilter, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;

/// Thread-safe in-memory task repository.
///
/// Transitions run their authorization check and write under one write lock,
/// which serialises concurrent transitions on any task.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    tombstones: HashSet<TaskId>,
}

impl InMemoryTaskState {
    fn remove(&mut self, id: TaskId) -> bool {
        if self.tasks.remove(&id).is_some() {
            self.tombstones.insert(id);
            return true;
        }
        false
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) || state.tombstones.contains(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        stored.merge_details(task);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn query(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn apply_transition(
        &self,
        command: &TransitionCommand,
    ) -> TaskRepositoryResult<Option<Task>> {
        let mut state = self.state.write().map_err(lock_error)?;
        let Some(task) = state.tasks.get_mut(&command.task_id()) else {
            return Ok(None);
        };
        if !command.authorize(task).is_allowed() {
            return Ok(None);
        }
        task.apply(command);
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        Ok(state.remove(id))
    }

    async fn clear_assignee(&self, user: UserId) -> TaskRepositoryResult<usize> {
        let mut state = self.state.write().map_err(lock_error)?;
        let mut cleared = 0;
        for task in state.tasks.values_mut() {
            if task.assignee() == Some(user) {
                task.unassign();
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn delete_owned_by(&self, user: UserId) -> TaskRepositoryResult<usize> {
        let mut state = self.state.write().map_err(lock_error)?;
        let owned: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.owner() == user)
            .map(Task::id)
            .collect();
        Ok(owned.into_iter().filter(|id| state.remove(*id)).count())
    }
}
