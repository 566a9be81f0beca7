//! Registration repository implementation
//!
//! Plain pool-backed queries over the registration entity. Capacity-sensitive
//! writes (join, promotion) do not live here: they run inside transactions
//! owned by the registration and promotion services so the count check and the
//! write share one locked scope.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::registration::{
    AttendanceStats, Registration, RegistrationStatus, RegistrationWithUser,
};
use crate::utils::errors::GatherlyError;

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

const REGISTRATION_COLUMNS: &str =
    "id, event_id, user_id, status, registered_at, attended, attended_at";

const REGISTRATION_WITH_USER_COLUMNS: &str =
    "r.id, r.event_id, r.user_id, r.status, r.registered_at, r.attended, r.attended_at, \
     u.name AS user_name, u.email AS user_email, u.picture AS user_picture";

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Registration>, GatherlyError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration by ID together with the registrant
    pub async fn find_by_id_with_user(
        &self,
        id: Uuid,
    ) -> Result<Option<RegistrationWithUser>, GatherlyError> {
        let registration = sqlx::query_as::<_, RegistrationWithUser>(&format!(
            r#"
            SELECT {REGISTRATION_WITH_USER_COLUMNS}
            FROM registrations r
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find a user's registration for an event, regardless of status
    pub async fn find_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Registration>, GatherlyError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// All registrations for an event with registrant info, FIFO ordered
    pub async fn list_for_event_with_user(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<RegistrationWithUser>, GatherlyError> {
        let registrations = sqlx::query_as::<_, RegistrationWithUser>(&format!(
            r#"
            SELECT {REGISTRATION_WITH_USER_COLUMNS}
            FROM registrations r
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.event_id = $1
            ORDER BY r.registered_at ASC
            "#
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Registered entries with registrant info, used by the reminder sweep
    pub async fn list_registered_with_user(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<RegistrationWithUser>, GatherlyError> {
        let registrations = sqlx::query_as::<_, RegistrationWithUser>(&format!(
            r#"
            SELECT {REGISTRATION_WITH_USER_COLUMNS}
            FROM registrations r
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.event_id = $1 AND r.status = 'REGISTERED'
            ORDER BY r.registered_at ASC
            "#
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// A user's registrations across events, oldest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Registration>, GatherlyError> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE user_id = $1 ORDER BY registered_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Update registration status directly (admin override path)
    pub async fn set_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Registration, GatherlyError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = $2
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Set or clear the attendance mark
    pub async fn set_attendance(
        &self,
        id: Uuid,
        attended: bool,
    ) -> Result<Registration, GatherlyError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET attended = $2,
                attended_at = CASE WHEN $2 THEN NOW() ELSE NULL END
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(attended)
        .fetch_one(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Count registrations for an event in a given status
    pub async fn count_by_status(
        &self,
        event_id: Uuid,
        status: RegistrationStatus,
    ) -> Result<i64, GatherlyError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = $2",
        )
        .bind(event_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Per-event attendance statistics for the admin surface
    pub async fn attendance_stats(&self, event_id: Uuid) -> Result<AttendanceStats, GatherlyError> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'REGISTERED'),
                   COUNT(*) FILTER (WHERE status = 'WAITING_LIST'),
                   COUNT(*) FILTER (WHERE attended),
                   COUNT(*) FILTER (WHERE status = 'CANCELLED')
            FROM registrations
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AttendanceStats {
            total: row.0,
            registered: row.1,
            waiting_list: row.2,
            attended: row.3,
            cancelled: row.4,
        })
    }
}
