//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub smtp: SmtpConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitSettings,
    pub reminder: ReminderConfig,
    pub logging: LoggingConfig,
}

/// General application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Public base URL, used for links embedded in outbound email
    pub base_url: String,
    /// Community display name used as the email sender name
    pub community_name: String,
}

/// Database pool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// SMTP relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

/// Scanner token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Scanner bearer token validity in days
    pub scanner_token_days: i64,
}

/// Per-action rate limit policies
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitSettings {
    pub join: RateLimitPolicy,
    pub admin: RateLimitPolicy,
    pub scanner_auth: RateLimitPolicy,
    /// Interval between sweeps of fully-expired limiter keys
    pub sweep_interval_secs: u64,
}

/// A single sliding-window policy
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window_secs: u64,
}

/// Event reminder sweep configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// How often the reminder sweep runs
    pub interval_hours: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("GATHERLY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::GatherlyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppConfig {
                base_url: "http://localhost:3000".to_string(),
                community_name: "Gatherly".to_string(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/gatherly".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
                max_lifetime_secs: 1800,
            },
            smtp: SmtpConfig {
                host: "smtp.gmail.com".to_string(),
                port: 587,
                username: String::new(),
                password: String::new(),
                from_email: "noreply@gatherly.local".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                scanner_token_days: 7,
            },
            rate_limit: RateLimitSettings {
                join: RateLimitPolicy {
                    limit: 5,
                    window_secs: 30,
                },
                admin: RateLimitPolicy {
                    limit: 20,
                    window_secs: 60,
                },
                scanner_auth: RateLimitPolicy {
                    limit: 5,
                    window_secs: 300,
                },
                sweep_interval_secs: 60,
            },
            reminder: ReminderConfig {
                enabled: true,
                interval_hours: 24,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/gatherly".to_string(),
            },
        }
    }
}
