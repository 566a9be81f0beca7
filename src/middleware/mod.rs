//! Middleware module
//!
//! This module contains middleware for request processing

pub mod rate_limit;

// Re-export commonly used middleware
pub use rate_limit::RateLimiter;
