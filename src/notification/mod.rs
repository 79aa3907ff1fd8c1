//! Outbound notifications to task owners and assignees.
//!
//! Deliveries are composed from templates in [`domain`] and handed to the
//! bounded [`NotificationDispatcher`](services::NotificationDispatcher) in
//! [`services`], which sends them through the chat transport without ever
//! failing the lifecycle operation that triggered them.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
