//! Taskbot: chat-driven task assignment with proof of completion.
//!
//! An owner creates a task for an assignee; the assignee accepts it,
//! requests completion and submits evidence (text, photo, video or
//! document) through inline buttons and uploads in the chat; the owner
//! approves. Every step is an atomic, actor-checked transition, and the
//! other party is notified without delaying the step itself.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, chat API)
//! - **Services**: Orchestration over ports
//!
//! # Modules
//!
//! - [`task`]: Task records, lifecycle transitions and owner operations
//! - [`user`]: User directory and chat linking
//! - [`messaging`]: Chat transport ports with in-memory and Telegram adapters
//! - [`notification`]: Message templates and the per-task ordered dispatcher
//! - [`bot`]: Button payloads, evidence contexts, routing and the dispatch loop
//! - [`config`]: Environment configuration
//!
//! # Embedding
//!
//! The `taskbot` binary only runs the chat side: it routes button presses and
//! evidence uploads. Task creation, editing and deletion belong to the host
//! application that owns the task records. Such a host builds a
//! [`task::services::TaskService`] over the same repository, installs a
//! [`notification::services::CreationNotifier`] through
//! `TaskService::with_creation_hook`, and links chats to users with
//! [`user::services::UserService`].

pub mod bot;
pub mod config;
pub mod messaging;
pub mod notification;
pub mod task;
pub mod user;

#[cfg(test)]
mod test_support;
