//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod hooks;
pub mod repository;

pub use hooks::TaskCreatedHook;
pub use repository::{TaskFilter, TaskRepository, TaskRepositoryError, TaskRepositoryResult};

#[cfg(test)]
pub use hooks::MockTaskCreatedHook;
