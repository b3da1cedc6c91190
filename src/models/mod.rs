//! Data models

pub mod user;

pub use user::{ActivityKind, CreateUserRequest, UpdateUserRequest, User, UserStats};
