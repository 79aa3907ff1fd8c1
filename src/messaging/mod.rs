//! Chat messaging surface for the task bot.
//!
//! Defines how the core addresses chats and reads inbound button presses and
//! uploads, independent of the concrete chat service:
//!
//! - Addressing and event types in [`domain`]
//! - Outbound and inbound port contracts in [`ports`]
//! - In-memory and Telegram adapters in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
