//! Task records and their lifecycle.
//!
//! Owners create tasks and optionally assign them; the assignee accepts,
//! works, and submits completion evidence that the owner approves. The
//! module follows hexagonal architecture:
//!
//! - Domain types and the transition rules in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The lifecycle engine and owner task management in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
