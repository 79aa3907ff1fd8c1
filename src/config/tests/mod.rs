//! Unit tests for environment configuration.
