//! Unit tests for the messaging adapters.
