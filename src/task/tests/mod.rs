//! Unit tests for the task context.


use crate::task::domain::{PersistedTaskData, Task, TaskDescription, TaskId, TaskName, TaskStatus};
use crate::user::domain::UserId;
use chrono::{TimeDelta, Utc};

/// Builds a task directly in `status`, bypassing the lifecycle.
fn task_in(status: TaskStatus, owner: UserId, assignee: Option<UserId>) -> Task {
    let now = Utc::now();
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        name: TaskName::new("Write report").expect("valid name"),
        description: TaskDescription::new("").expect("valid description"),
        status,
        owner,
        assignee,
        end_date: now + TimeDelta::days(1),
        created_at: now,
        updated_at: now,
        completed_at: None,
        evidence: None,
    })
    .expect("valid persisted task")
}
