//! Adapter implementations for the messaging ports.

pub mod memory;
pub mod telegram;
