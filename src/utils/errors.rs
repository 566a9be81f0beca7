//! Error handling for Gatherly
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the Gatherly application
#[derive(Error, Debug)]
pub enum GatherlyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Please sign in first")]
    NotLoggedIn,

    #[error("Unauthorized")]
    NotAuthorized,

    #[error("Rate limit exceeded. Try again in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("User not found")]
    UserNotFound,

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: Uuid },

    #[error("Registration not found")]
    RegistrationNotFound,

    #[error("You are already registered for this event")]
    AlreadyRegistered,

    #[error("Registration is closed for this event")]
    RegistrationClosed,

    #[error("Only registered users can be marked as attended")]
    InvalidAttendanceState,

    #[error("User has already been marked as attended")]
    AlreadyCheckedIn,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Email delivery error: {0}")]
    Email(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gatherly operations
pub type Result<T> = std::result::Result<T, GatherlyError>;

impl GatherlyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            GatherlyError::Database(_) => false,
            GatherlyError::Migration(_) => false,
            GatherlyError::Config(_) => false,
            GatherlyError::NotLoggedIn => false,
            GatherlyError::NotAuthorized => false,
            GatherlyError::RateLimited { .. } => true,
            GatherlyError::UserNotFound => false,
            GatherlyError::EventNotFound { .. } => false,
            GatherlyError::RegistrationNotFound => false,
            GatherlyError::AlreadyRegistered => false,
            GatherlyError::RegistrationClosed => false,
            GatherlyError::InvalidAttendanceState => false,
            GatherlyError::AlreadyCheckedIn => false,
            GatherlyError::Validation(_) => false,
            GatherlyError::Email(_) => true,
            GatherlyError::Token(_) => false,
            GatherlyError::Serialization(_) => false,
            GatherlyError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GatherlyError::Database(_) => ErrorSeverity::Critical,
            GatherlyError::Migration(_) => ErrorSeverity::Critical,
            GatherlyError::Config(_) => ErrorSeverity::Critical,
            GatherlyError::NotLoggedIn => ErrorSeverity::Info,
            GatherlyError::NotAuthorized => ErrorSeverity::Warning,
            GatherlyError::RateLimited { .. } => ErrorSeverity::Warning,
            GatherlyError::Email(_) => ErrorSeverity::Error,
            GatherlyError::Token(_) => ErrorSeverity::Warning,
            GatherlyError::AlreadyRegistered
            | GatherlyError::RegistrationClosed
            | GatherlyError::InvalidAttendanceState
            | GatherlyError::AlreadyCheckedIn
            | GatherlyError::Validation(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classification() {
        assert_eq!(
            GatherlyError::Config("missing".into()).severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            GatherlyError::AlreadyRegistered.severity(),
            ErrorSeverity::Info
        );
        assert_eq!(
            GatherlyError::RateLimited { retry_after_secs: 10 }.severity(),
            ErrorSeverity::Warning
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(GatherlyError::RateLimited { retry_after_secs: 5 }.is_recoverable());
        assert!(GatherlyError::Email("relay down".into()).is_recoverable());
        assert!(!GatherlyError::AlreadyCheckedIn.is_recoverable());
    }

    #[test]
    fn test_user_facing_messages() {
        let err = GatherlyError::RateLimited { retry_after_secs: 12 };
        assert!(err.to_string().contains("12 seconds"));

        let err = GatherlyError::InvalidAttendanceState;
        assert!(err.to_string().contains("registered users"));
    }
}
