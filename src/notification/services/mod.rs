//! Notification composition and delivery.

mod composer;
mod creation;
mod dispatcher;

pub use composer::NotificationComposer;
pub use creation::CreationNotifier;
pub use dispatcher::{DispatcherConfig, DispatcherStats, NotificationDispatcher};
