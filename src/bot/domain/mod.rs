//! Bot-level value types.

mod payload;

pub use payload::{ButtonPayload, ButtonPayloadError, ButtonVerb};
