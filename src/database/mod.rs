//! Database module
//!
//! This module handles database connections and operations

pub mod connection;
pub mod repositories;

pub use connection::{create_pool, health_check, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::UserRepository;
