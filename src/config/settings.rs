//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from the environment (and a `.env` file loaded by
//! the binary before construction).

use serde::{Deserialize, Serialize};

/// Main application configuration, loaded once at startup and passed by
/// reference into every component. There is no global settings lookup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // Bot
    pub bot_token: String,
    pub bot_username: Option<String>,

    // Database
    pub database_url: String,
    pub database_test_url: Option<String>,

    // Redis (accepted for deployment parity, no integration built yet)
    pub redis_url: Option<String>,

    // Application
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_environment")]
    pub environment: String,

    // Security
    pub secret_key: String,
    pub webhook_secret: Option<String>,

    // External APIs
    pub openai_api_key: Option<String>,

    // Monitoring
    pub sentry_dsn: Option<String>,

    // Webhook transport
    pub webhook_url: Option<String>,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,

    // Rate limiting
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: u32,
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window: u64,

    // Static admin allowlist, comma-separated in the environment
    #[serde(default)]
    pub admin_ids: Vec<i64>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

fn default_webhook_port() -> u16 {
    8080
}

fn default_rate_limit_requests() -> u32 {
    30
}

fn default_rate_limit_window() -> u64 {
    60
}

impl Settings {
    /// Load settings from environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .list_separator(",")
                    .with_list_parse_key("admin_ids")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::BotError> {
        super::validation::validate_settings(self)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Public webhook URL, derived from the base URL and the path
    pub fn public_webhook_url(&self) -> Option<String> {
        self.webhook_url
            .as_ref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), self.webhook_path))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            bot_username: None,
            database_url: "postgresql://localhost/echobuddy".to_string(),
            database_test_url: None,
            redis_url: None,
            debug: false,
            log_level: default_log_level(),
            environment: default_environment(),
            secret_key: String::new(),
            webhook_secret: None,
            openai_api_key: None,
            sentry_dsn: None,
            webhook_url: None,
            webhook_path: default_webhook_path(),
            webhook_port: default_webhook_port(),
            rate_limit_requests: default_rate_limit_requests(),
            rate_limit_window: default_rate_limit_window(),
            admin_ids: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.webhook_path, "/webhook");
        assert_eq!(settings.webhook_port, 8080);
        assert_eq!(settings.rate_limit_requests, 30);
        assert_eq!(settings.rate_limit_window, 60);
        assert!(settings.is_development());
        assert!(!settings.is_production());
    }

    #[test]
    fn test_public_webhook_url() {
        let mut settings = Settings::default();
        assert_eq!(settings.public_webhook_url(), None);

        settings.webhook_url = Some("https://bot.example.com".to_string());
        assert_eq!(
            settings.public_webhook_url().as_deref(),
            Some("https://bot.example.com/webhook")
        );

        settings.webhook_url = Some("https://bot.example.com/".to_string());
        assert_eq!(
            settings.public_webhook_url().as_deref(),
            Some("https://bot.example.com/webhook")
        );
    }
}
