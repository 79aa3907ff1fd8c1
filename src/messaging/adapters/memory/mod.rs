//! In-memory messaging adapters.

mod source;
mod transport;

pub use source::InMemoryEventSource;
pub use transport::{InMemoryTransport, TransportCall};
