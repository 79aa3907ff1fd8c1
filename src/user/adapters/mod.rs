//! Adapter implementations for the user directory port.

pub mod memory;
pub mod postgres;
