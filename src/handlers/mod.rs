//! Bot handlers module
//!
//! Telegram update handlers organized by type:
//! - Command handlers for bot commands
//! - Message handlers for text and media content

pub mod commands;
pub mod messages;

// Re-export commonly used handler functions
pub use commands::*;
pub use messages::*;
