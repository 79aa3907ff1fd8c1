//! Creation-time notifications, detached from the creating request.

use super::{NotificationComposer, NotificationDispatcher};
use crate::notification::domain::NotificationKind;
use crate::task::{domain::Task, ports::TaskCreatedHook};
use crate::user::{
    domain::{User, UserId},
    ports::UserDirectory,
};
use std::sync::Arc;
use tracing::warn;

/// [`TaskCreatedHook`] that announces new tasks to the owner and assignee.
///
/// `on_task_created` only reserves a slot in the task's dispatcher queue and
/// returns. User lookup, rendering and sending happen later on the worker,
/// so slow or failing delivery never affects task creation, and the creation
/// notice still goes out before any later notice about the same task.
pub struct CreationNotifier<U>
where
    U: UserDirectory + 'static,
{
    directory: Arc<U>,
    composer: Arc<NotificationComposer>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl<U> CreationNotifier<U>
where
    U: UserDirectory + 'static,
{
    /// Creates a notifier.
    #[must_use]
    pub const fn new(
        directory: Arc<U>,
        composer: Arc<NotificationComposer>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            directory,
            composer,
            dispatcher,
        }
    }
}

async fn lookup<U: UserDirectory>(directory: &U, id: UserId) -> Option<User> {
    match directory.find_by_id(id).await {
        Ok(user) => user,
        Err(err) => {
            warn!(user_id = %id, error = %err, "user lookup failed for notification");
            None
        }
    }
}

impl<U> TaskCreatedHook for CreationNotifier<U>
where
    U: UserDirectory + 'static,
{
    fn on_task_created(&self, task: &Task) {
        let snapshot = task.clone();
        let directory = Arc::clone(&self.directory);
        let composer = Arc::clone(&self.composer);

        self.dispatcher
            .defer(NotificationKind::TaskCreated, task.id(), async move {
                let owner = lookup(&*directory, snapshot.owner()).await;
                let assignee = match snapshot.assignee() {
                    Some(id) => lookup(&*directory, id).await,
                    None => None,
                };
                composer
                    .task_created(&snapshot, owner.as_ref(), assignee.as_ref())
                    .inspect_err(|err| {
                        warn!(
                            task_id = %snapshot.id(),
                            error = %err,
                            "failed to compose creation notification"
                        );
                    })
                    .ok()
            });
    }
}
