//! Repository implementations

pub mod user;

pub use user::UserRepository;
