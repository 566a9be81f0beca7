//! Handlers module
//!
//! Transport-agnostic entry points that an HTTP layer or job runner can call.
//! Each handler applies rate limiting and authorization before touching the
//! services.

pub mod admin;
pub mod checkin;
pub mod registrations;

pub use admin::{ScannerTokenResponse, ToggleAttendanceResponse};
pub use checkin::CheckInResponse;
pub use registrations::{JoinEventResponse, LeaveEventResponse};
