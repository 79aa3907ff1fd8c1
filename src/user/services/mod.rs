//! Application services for user management.

mod registration;

pub use registration::{UserService, UserServiceError, UserServiceResult};
