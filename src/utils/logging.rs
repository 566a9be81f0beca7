//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Gatherly application.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "gatherly.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}

/// Log registration state transitions with structured data
pub fn log_registration_transition(
    registration_id: Uuid,
    event_id: Uuid,
    from: &str,
    to: &str,
) {
    info!(
        registration_id = %registration_id,
        event_id = %event_id,
        from = from,
        to = to,
        "Registration transition"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_email: &str, action: &str, target: Option<&str>) {
    warn!(
        admin = admin_email,
        action = action,
        target = target,
        "Admin action performed"
    );
}
