//! Attendance check-in
//!
//! QR-driven check-in at the venue: the scanned payload is the registration
//! id. Only a REGISTERED, not-yet-attended row can be checked in; the write is
//! a conditional update so two scanners racing on the same ticket cannot both
//! succeed.

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::registration::{Registration, RegistrationStatus};
use crate::utils::errors::{GatherlyError, Result};
use crate::utils::logging::log_registration_transition;

const REGISTRATION_COLUMNS: &str =
    "id, event_id, user_id, status, registered_at, attended, attended_at";

/// Guard shared by the service and the scan surface
pub fn ensure_can_check_in(status: RegistrationStatus, attended: bool) -> Result<()> {
    if status != RegistrationStatus::Registered {
        return Err(GatherlyError::InvalidAttendanceState);
    }
    if attended {
        return Err(GatherlyError::AlreadyCheckedIn);
    }
    Ok(())
}

/// Result of a successful check-in
#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    pub registration: Registration,
    pub registrant_name: String,
    pub message: String,
}

#[derive(Clone)]
pub struct AttendanceService {
    pool: PgPool,
    db: DatabaseService,
}

impl AttendanceService {
    pub fn new(pool: PgPool, db: DatabaseService) -> Self {
        Self { pool, db }
    }

    /// Mark a scanned registration as attended.
    ///
    /// The update only matches a REGISTERED, unattended row; when it matches
    /// nothing the current row is re-read to report why.
    pub async fn check_in(&self, registration_id: Uuid) -> Result<CheckInOutcome> {
        let current = self
            .db
            .registrations
            .find_by_id_with_user(registration_id)
            .await?
            .ok_or(GatherlyError::RegistrationNotFound)?;

        let updated = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET attended = TRUE, attended_at = NOW()
            WHERE id = $1 AND status = 'REGISTERED' AND attended = FALSE
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(registration_id)
        .fetch_optional(&self.pool)
        .await?;

        let registration = match updated {
            Some(registration) => registration,
            None => {
                // Lost a race or scanned an ineligible ticket; classify from
                // the row as it stands now
                let row = self
                    .db
                    .registrations
                    .find_by_id(registration_id)
                    .await?
                    .ok_or(GatherlyError::RegistrationNotFound)?;
                ensure_can_check_in(row.status, row.attended)?;
                return Err(GatherlyError::InvalidAttendanceState);
            }
        };

        log_registration_transition(
            registration_id,
            registration.event_id,
            "REGISTERED",
            "ATTENDED",
        );

        Ok(CheckInOutcome {
            message: format!("{} checked in successfully!", current.user_name),
            registrant_name: current.user_name,
            registration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_registered_unattended_can_check_in() {
        assert!(ensure_can_check_in(RegistrationStatus::Registered, false).is_ok());
    }

    #[test]
    fn test_waiting_list_cannot_check_in() {
        let err = ensure_can_check_in(RegistrationStatus::WaitingList, false).unwrap_err();
        assert_matches!(err, GatherlyError::InvalidAttendanceState);
    }

    #[test]
    fn test_cancelled_cannot_check_in() {
        let err = ensure_can_check_in(RegistrationStatus::Cancelled, false).unwrap_err();
        assert_matches!(err, GatherlyError::InvalidAttendanceState);
    }

    #[test]
    fn test_second_scan_is_rejected() {
        let err = ensure_can_check_in(RegistrationStatus::Registered, true).unwrap_err();
        assert_matches!(err, GatherlyError::AlreadyCheckedIn);
    }
}
