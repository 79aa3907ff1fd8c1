//! Port contracts for inbound event handling.

mod handler;

pub use handler::InboundHandler;
