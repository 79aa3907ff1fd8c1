//! Port contracts for user storage.

pub mod directory;

pub use directory::{UserDirectory, UserDirectoryError, UserDirectoryResult};
