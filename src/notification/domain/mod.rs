//! Outbound notification values and their text templates.

mod delivery;
mod templates;

pub use delivery::{Delivery, MessageBody, NotificationKind, OutboundMessage};
pub use templates::{
    MessageTemplates, NotificationError, NotificationResult, Template, TaskView,
    format_timestamp,
};
