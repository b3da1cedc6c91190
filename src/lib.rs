//! EchoBuddy Telegram Bot
//!
//! A template-driven echo bot that greets users, summarizes every kind of
//! content it receives, and keeps per-user activity records in PostgreSQL.
//! The library exposes the configuration, persistence, service, and handler
//! layers so they can be exercised independently of the running bot.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{BotError, Result};

// Re-export main components for easy access
pub use database::repositories::UserRepository;
pub use services::{ServiceFactory, UserService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
