//! Unit tests for the bot context.
