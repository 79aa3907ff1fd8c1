//! Domain model for task lifecycle management.
//!
//! The task domain models the task record, its completion evidence and the
//! transition rules that move it through the lifecycle, while keeping all
//! infrastructure concerns outside of the domain boundary.

mod error;
mod evidence;
mod ids;
mod task;
mod transition;

pub use error::{ParseMediaKindError, ParseTaskStatusError, TaskDomainError};
pub use evidence::{Evidence, MediaKind, MediaRef};
pub use ids::{TaskDescription, TaskId, TaskName};
pub use task::{NewTaskParams, PersistedTaskData, Task, TaskStatus};
pub use transition::{ActorRole, Authorization, Transition, TransitionCommand, authorize};
