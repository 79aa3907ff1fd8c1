//! Chat-facing side of the task bot.
//!
//! Decodes button payloads, keeps track of who owes evidence for which task,
//! routes inbound events to the lifecycle engine and runs the single
//! dispatch loop that feeds them in arrival order.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
