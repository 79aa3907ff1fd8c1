//! Registered users and their chat links.
//!
//! - Domain types in [`domain`]
//! - The [`UserDirectory`](ports::UserDirectory) port in [`ports`]
//! - In-memory and `PostgreSQL` adapters in [`adapters`]
//! - Registration and removal in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
