//! Waiting-list promotion
//!
//! Moves waiting entries into freed or newly added slots, strictly FIFO by
//! registration time. The promoter never trusts the caller's slot count: it
//! re-derives free capacity inside its own transaction with the event row
//! locked, so a promotion racing a join can never overshoot the cap.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::registration::RegistrationWithUser;
use crate::services::capacity;
use crate::services::notification::{EventEmailInfo, NotificationKind, NotificationService, Recipient};
use crate::utils::errors::{GatherlyError, Result};
use crate::utils::logging::log_registration_transition;

const EVENT_COLUMNS: &str =
    "id, slug, title, description, location, location_map_url, image_url, instagram_url, \
     event_date, max_capacity, registration_status, category_id, created_by, created_at, updated_at";

const WAITING_WITH_USER_COLUMNS: &str =
    "r.id, r.event_id, r.user_id, r.status, r.registered_at, r.attended, r.attended_at, \
     u.name AS user_name, u.email AS user_email, u.picture AS user_picture";

/// Slots the promoter may actually fill: the requested count clamped to the
/// free capacity at this instant
pub fn effective_slots(requested: i64, max_capacity: Option<i32>, registered_count: i64) -> i64 {
    requested
        .max(0)
        .min(capacity::available_slots(max_capacity, registered_count))
}

#[derive(Clone)]
pub struct PromotionService {
    pool: PgPool,
    notifications: NotificationService,
}

impl PromotionService {
    pub fn new(pool: PgPool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Promote up to `slots` waiting entries for an event, FIFO.
    ///
    /// Returns the number promoted; zero when nobody is waiting or no capacity
    /// is actually free. Notification fan-out happens after the commit.
    pub async fn promote(&self, event_id: Uuid, slots: i64) -> Result<usize> {
        if slots <= 0 {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GatherlyError::EventNotFound { event_id })?;

        let (registered_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'REGISTERED'",
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        let open = effective_slots(slots, event.max_capacity, registered_count);
        if open == 0 {
            return Ok(0);
        }

        let waiting = sqlx::query_as::<_, RegistrationWithUser>(&format!(
            r#"
            SELECT {WAITING_WITH_USER_COLUMNS}
            FROM registrations r
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.event_id = $1 AND r.status = 'WAITING_LIST'
            ORDER BY r.registered_at ASC
            LIMIT $2
            FOR UPDATE OF r
            "#
        ))
        .bind(event_id)
        .bind(open)
        .fetch_all(&mut *tx)
        .await?;

        if waiting.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Uuid> = waiting.iter().map(|w| w.id).collect();
        sqlx::query("UPDATE registrations SET status = 'REGISTERED' WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            event_id = %event_id,
            promoted = waiting.len(),
            "Promoted waiting list entries"
        );

        for entry in &waiting {
            log_registration_transition(entry.id, event_id, "WAITING_LIST", "REGISTERED");
            self.notifications.dispatch(
                NotificationKind::WaitingListPromoted,
                Recipient {
                    name: entry.user_name.clone(),
                    email: entry.user_email.clone(),
                },
                EventEmailInfo::from_event(&event, entry.id),
            );
        }

        Ok(waiting.len())
    }

    /// Promotion hook for a capacity raise. The freed headroom is re-derived
    /// under the lock, so passing the new capacity as the request is safe.
    pub async fn promote_on_capacity_increase(
        &self,
        event_id: Uuid,
        new_capacity: i32,
    ) -> Result<usize> {
        self.promote(event_id, i64::from(new_capacity)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_slots_clamps_to_free_capacity() {
        // 10 cap, 8 registered: at most 2 can be filled no matter the request
        assert_eq!(effective_slots(5, Some(10), 8), 2);
        assert_eq!(effective_slots(1, Some(10), 8), 1);
    }

    #[test]
    fn test_effective_slots_zero_when_full_or_over() {
        assert_eq!(effective_slots(3, Some(10), 10), 0);
        assert_eq!(effective_slots(3, Some(10), 12), 0);
    }

    #[test]
    fn test_effective_slots_negative_request_is_zero() {
        assert_eq!(effective_slots(-1, Some(10), 0), 0);
    }

    #[test]
    fn test_effective_slots_unlimited_capacity() {
        assert_eq!(effective_slots(4, None, 1_000), 4);
    }

    #[test]
    fn test_capacity_increase_fills_only_the_delta() {
        // Raise from 10 to 12 with 10 registered: the new cap as request
        // still clamps to the 2 freed slots
        assert_eq!(effective_slots(12, Some(12), 10), 2);
    }
}
