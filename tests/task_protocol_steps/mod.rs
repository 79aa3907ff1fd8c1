//! Step definitions for task protocol behaviour scenarios.

pub mod then;
pub mod when;
