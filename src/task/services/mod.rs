//! Application services for task lifecycle orchestration.

mod lifecycle;
mod tasks;

pub use lifecycle::{LifecycleEngine, TaskLifecycleError, TaskLifecycleResult};
pub use tasks::{CreateTaskRequest, TaskService, UpdateTaskRequest};
