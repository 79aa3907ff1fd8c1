//! Callback port invoked after a task is committed.

use crate::task::domain::Task;

/// Observer notified once a newly created task is durably stored.
///
/// Implementations must return promptly: the hook runs on the creation path
/// and must not wait on network I/O. Slow work is expected to be queued and
/// finished elsewhere.
#[cfg_attr(test, mockall::automock)]
pub trait TaskCreatedHook: Send + Sync {
    /// Called with the stored task.
    fn on_task_created(&self, task: &Task);
}
