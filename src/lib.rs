//! Gatherly event registration core
//!
//! Community event management: capacity-aware registration with a FIFO
//! waiting list, QR attendance check-in, admin overrides and email
//! notifications. This library exposes transport-agnostic handlers on top of
//! a PostgreSQL-backed service layer.

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
pub use utils::errors::{GatherlyError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use middleware::RateLimiter;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
