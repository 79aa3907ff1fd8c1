//! Port contracts for the chat transport.
//!
//! The outbound half sends and edits messages; the inbound half yields
//! batches of events for the dispatch loop.

pub mod source;
pub mod transport;

pub use source::EventSource;
pub use transport::{MessagingTransport, TransportError, TransportResult};
