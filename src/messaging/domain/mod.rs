//! Transport-neutral chat addressing, outbound buttons and inbound events.

mod address;
mod event;

pub use address::{Button, CallbackId, ChatId, MessageId, MessageRef};
pub use event::InboundEvent;
