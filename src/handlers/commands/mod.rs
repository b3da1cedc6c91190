//! Command handlers

pub mod help;
pub mod settings;
pub mod start;
pub mod stats;
