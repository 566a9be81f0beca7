//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{GatherlyError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_smtp_config(&settings.smtp)?;
    validate_auth_config(&settings.auth)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(GatherlyError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(GatherlyError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(GatherlyError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    if config.acquire_timeout_secs == 0 {
        return Err(GatherlyError::Config(
            "Acquire timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate SMTP configuration
fn validate_smtp_config(config: &super::SmtpConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(GatherlyError::Config("SMTP host is required".to_string()));
    }

    if config.from_email.is_empty() || !config.from_email.contains('@') {
        return Err(GatherlyError::Config(
            "A valid SMTP from address is required".to_string(),
        ));
    }

    Ok(())
}

/// Validate scanner token configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(GatherlyError::Config("JWT secret is required".to_string()));
    }

    if config.scanner_token_days <= 0 {
        return Err(GatherlyError::Config(
            "Scanner token validity must be at least one day".to_string(),
        ));
    }

    Ok(())
}

/// Validate rate limit configuration
fn validate_rate_limit_config(config: &super::RateLimitSettings) -> Result<()> {
    for (name, policy) in [
        ("join", &config.join),
        ("admin", &config.admin),
        ("scanner_auth", &config.scanner_auth),
    ] {
        if policy.limit == 0 {
            return Err(GatherlyError::Config(format!(
                "Rate limit for '{}' must be greater than 0",
                name
            )));
        }
        if policy.window_secs == 0 {
            return Err(GatherlyError::Config(format!(
                "Rate limit window for '{}' must be greater than 0",
                name
            )));
        }
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(GatherlyError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(GatherlyError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "test-secret".to_string();
        settings
    }

    #[test]
    fn test_default_settings_require_jwt_secret() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_valid_settings_pass() {
        let settings = valid_settings();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_default_pool_timings_are_sane() {
        let settings = valid_settings();
        assert!(settings.database.acquire_timeout_secs > 0);
        assert!(settings.database.idle_timeout_secs <= settings.database.max_lifetime_secs);
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_zero_acquire_timeout() {
        let mut settings = valid_settings();
        settings.database.acquire_timeout_secs = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_zero_rate_limit() {
        let mut settings = valid_settings();
        settings.rate_limit.join.limit = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_invalid_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_bad_from_address() {
        let mut settings = valid_settings();
        settings.smtp.from_email = "not-an-address".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
