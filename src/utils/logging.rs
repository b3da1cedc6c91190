//! Logging configuration and setup
//!
//! Structured logging via tracing: JSON output in production, colorized
//! console output in development.

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_new(&settings.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(true))
            .init();
    }

    info!(level = %settings.log_level, environment = %settings.environment, "Logging initialized");
    Ok(())
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action"
    );
}

/// Log errors with context
pub fn log_error(err: &crate::utils::errors::BotError, context: Option<&str>) {
    error!(
        error = %err,
        recoverable = err.is_recoverable(),
        context = context,
        "Error occurred"
    );
}
