//! Configuration validation module
//!
//! Validation functions that ensure all required settings are properly
//! configured before the bot starts.

use super::Settings;
use crate::utils::errors::{BotError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.bot_token.is_empty() {
        return Err(BotError::Config("Bot token is required".to_string()));
    }

    if settings.database_url.is_empty() {
        return Err(BotError::Config("Database URL is required".to_string()));
    }

    if settings.secret_key.is_empty() {
        return Err(BotError::Config("Secret key is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&settings.log_level.to_lowercase().as_str()) {
        return Err(BotError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            settings.log_level, valid_levels
        )));
    }

    if settings.webhook_port == 0 {
        return Err(BotError::Config(
            "Webhook port must be greater than 0".to_string(),
        ));
    }

    if let Some(ref url) = settings.webhook_url {
        if url::Url::parse(url).is_err() {
            return Err(BotError::Config(format!("Invalid webhook URL: {}", url)));
        }
    }

    if settings.rate_limit_requests == 0 {
        return Err(BotError::Config(
            "Rate limit requests must be greater than 0".to_string(),
        ));
    }

    if settings.rate_limit_window == 0 {
        return Err(BotError::Config(
            "Rate limit window must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        Settings {
            bot_token: "123456:token".to_string(),
            secret_key: "secret".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut settings = valid_settings();
        settings.bot_token.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_missing_secret_key_rejected() {
        let mut settings = valid_settings();
        settings.secret_key.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut settings = valid_settings();
        settings.log_level = "loud".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_bad_webhook_url_rejected() {
        let mut settings = valid_settings();
        settings.webhook_url = Some("not a url".to_string());
        assert!(validate_settings(&settings).is_err());
    }
}
