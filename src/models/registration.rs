//! Registration model
//!
//! A registration is a user's claim on an event slot. Cancellation is a soft
//! state: rows are never deleted outside of an event cascade, and rejoining
//! reactivates the existing row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Registered,
    WaitingList,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "REGISTERED",
            RegistrationStatus::WaitingList => "WAITING_LIST",
            RegistrationStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    pub attended: bool,
    pub attended_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// Whether this row currently holds a claim on the event (any non-cancelled state)
    pub fn is_active(&self) -> bool {
        self.status != RegistrationStatus::Cancelled
    }
}

/// Registration joined with the registrant, for admin listings and notifications
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegistrationWithUser {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    pub attended: bool,
    pub attended_at: Option<DateTime<Utc>>,
    pub user_name: String,
    pub user_email: String,
    pub user_picture: String,
}

/// Per-event attendance statistics for the admin surface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total: i64,
    pub registered: i64,
    pub waiting_list: i64,
    pub attended: i64,
    pub cancelled: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let mut reg = Registration {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: RegistrationStatus::Registered,
            registered_at: Utc::now(),
            attended: false,
            attended_at: None,
        };
        assert!(reg.is_active());

        reg.status = RegistrationStatus::WaitingList;
        assert!(reg.is_active());

        reg.status = RegistrationStatus::Cancelled;
        assert!(!reg.is_active());
    }
}
