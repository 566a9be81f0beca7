//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod event;
pub mod registration;
pub mod user;

// Re-export commonly used models
pub use event::{
    generate_slug, CreateEventRequest, Event, EventStatus, EventType, UpdateEventRequest,
};
pub use registration::{
    AttendanceStats, Registration, RegistrationStatus, RegistrationWithUser,
};
pub use user::{CreateUserRequest, SessionUser, User, UserRole, UserStatus};
