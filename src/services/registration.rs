//! Registration state machine
//!
//! Owns every user-driven transition of a registration row: joining (fresh or
//! reactivated), leaving, and the admin status override. Transition decisions
//! are pure functions over a snapshot of the event and the row; the service
//! wraps them in a transaction that locks the event row so the capacity count
//! and the write cannot interleave with a concurrent join.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::event::{Event, EventStatus};
use crate::models::registration::{Registration, RegistrationStatus};
use crate::models::user::User;
use crate::services::capacity;
use crate::services::notification::{EventEmailInfo, NotificationKind, NotificationService, Recipient};
use crate::services::promotion::PromotionService;
use crate::utils::errors::{GatherlyError, Result};
use crate::utils::logging::log_registration_transition;

const REGISTRATION_COLUMNS: &str =
    "id, event_id, user_id, status, registered_at, attended, attended_at";

const EVENT_COLUMNS: &str =
    "id, slug, title, description, location, location_map_url, image_url, instagram_url, \
     event_date, max_capacity, registration_status, category_id, created_by, created_at, updated_at";

/// Where a user currently stands with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    /// No row exists for this (event, user) pair
    None,
    Registered,
    WaitingList,
    Cancelled,
}

impl RegistrationState {
    pub fn of(existing: Option<&Registration>) -> Self {
        match existing.map(|r| r.status) {
            None => RegistrationState::None,
            Some(RegistrationStatus::Registered) => RegistrationState::Registered,
            Some(RegistrationStatus::WaitingList) => RegistrationState::WaitingList,
            Some(RegistrationStatus::Cancelled) => RegistrationState::Cancelled,
        }
    }
}

/// The write a join request should perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPlan {
    /// Insert a fresh row with the given status
    Insert { status: RegistrationStatus },
    /// Reactivate a cancelled row: new status, fresh registered_at, attendance cleared
    Reactivate {
        registration_id: Uuid,
        status: RegistrationStatus,
    },
}

impl JoinPlan {
    pub fn status(&self) -> RegistrationStatus {
        match self {
            JoinPlan::Insert { status } | JoinPlan::Reactivate { status, .. } => *status,
        }
    }
}

/// Decide what a join request does, given a consistent snapshot.
///
/// `registered_count` must be counted under the same lock that guards the
/// eventual write, otherwise two concurrent joins can both see a free slot.
pub fn plan_join(
    event: &Event,
    existing: Option<&Registration>,
    registered_count: i64,
    now: DateTime<Utc>,
) -> Result<JoinPlan> {
    if event.registration_status == EventStatus::Closed {
        return Err(GatherlyError::RegistrationClosed);
    }
    if event.is_past(now) {
        return Err(GatherlyError::Validation(
            "This event has already taken place".to_string(),
        ));
    }

    let status = capacity::decide(event.max_capacity, registered_count);

    match RegistrationState::of(existing) {
        RegistrationState::None => Ok(JoinPlan::Insert { status }),
        RegistrationState::Cancelled => {
            // A Cancelled state always comes from an existing row
            let row = existing.ok_or(GatherlyError::RegistrationNotFound)?;
            Ok(JoinPlan::Reactivate {
                registration_id: row.id,
                status,
            })
        }
        RegistrationState::Registered | RegistrationState::WaitingList => {
            Err(GatherlyError::AlreadyRegistered)
        }
    }
}

/// Settle a post-cancellation promotion attempt.
///
/// The cancellation has already committed; a promotion failure must not turn
/// the caller's success into an error. The next freed slot retries naturally.
pub fn settle_promotion(event_id: Uuid, result: Result<usize>) -> usize {
    match result {
        Ok(count) => count,
        Err(e) => {
            warn!(event_id = %event_id, error = %e, "Promotion after cancellation failed");
            0
        }
    }
}

/// Outcome of a successful join
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub registration: Registration,
    pub reactivated: bool,
}

/// Outcome of a successful leave
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub registration: Registration,
    /// How many waiting entries were promoted into the freed slot
    pub promoted: usize,
}

/// Registration service: transactional writes plus notification fan-out
#[derive(Clone)]
pub struct RegistrationService {
    pool: PgPool,
    db: DatabaseService,
    notifications: NotificationService,
    promoter: PromotionService,
}

impl RegistrationService {
    pub fn new(
        pool: PgPool,
        db: DatabaseService,
        notifications: NotificationService,
        promoter: PromotionService,
    ) -> Self {
        Self {
            pool,
            db,
            notifications,
            promoter,
        }
    }

    /// Join an event, landing as REGISTERED or WAITING_LIST depending on capacity.
    ///
    /// The event row is locked for the duration of the transaction, so the
    /// REGISTERED count read here still holds when the row is written.
    pub async fn join(&self, event_id: Uuid, user: &User) -> Result<JoinOutcome> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GatherlyError::EventNotFound { event_id })?;

        let existing = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await?;

        let (registered_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'REGISTERED'",
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        let plan = plan_join(&event, existing.as_ref(), registered_count, Utc::now())?;

        let (registration, reactivated) = match plan {
            JoinPlan::Insert { status } => {
                let registration = sqlx::query_as::<_, Registration>(&format!(
                    r#"
                    INSERT INTO registrations (event_id, user_id, status)
                    VALUES ($1, $2, $3)
                    RETURNING {REGISTRATION_COLUMNS}
                    "#
                ))
                .bind(event_id)
                .bind(user.id)
                .bind(status)
                .fetch_one(&mut *tx)
                .await?;

                (registration, false)
            }
            JoinPlan::Reactivate {
                registration_id,
                status,
            } => {
                let registration = sqlx::query_as::<_, Registration>(&format!(
                    r#"
                    UPDATE registrations
                    SET status = $2,
                        registered_at = NOW(),
                        attended = FALSE,
                        attended_at = NULL
                    WHERE id = $1
                    RETURNING {REGISTRATION_COLUMNS}
                    "#
                ))
                .bind(registration_id)
                .bind(status)
                .fetch_one(&mut *tx)
                .await?;

                (registration, true)
            }
        };

        tx.commit().await?;

        log_registration_transition(
            registration.id,
            event_id,
            if reactivated { "CANCELLED" } else { "NONE" },
            registration.status.as_str(),
        );

        let kind = match registration.status {
            RegistrationStatus::Registered => NotificationKind::RegistrationConfirmed,
            _ => NotificationKind::WaitingListJoined,
        };
        self.notifications.dispatch(
            kind,
            Recipient {
                name: user.name.clone(),
                email: user.email.clone(),
            },
            EventEmailInfo::from_event(&event, registration.id),
        );

        Ok(JoinOutcome {
            registration,
            reactivated,
        })
    }

    /// Cancel the caller's registration. A freed REGISTERED slot triggers a
    /// single-slot promotion after the cancellation commits.
    pub async fn leave(&self, event_id: Uuid, user_id: Uuid) -> Result<LeaveOutcome> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Registration>(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM registrations
            WHERE event_id = $1 AND user_id = $2
            FOR UPDATE
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GatherlyError::RegistrationNotFound)?;

        let freed_slot = existing.status == RegistrationStatus::Registered;

        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = 'CANCELLED'
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(existing.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log_registration_transition(
            registration.id,
            event_id,
            existing.status.as_str(),
            registration.status.as_str(),
        );

        let promoted = if freed_slot {
            settle_promotion(event_id, self.promoter.promote(event_id, 1).await)
        } else {
            0
        };

        Ok(LeaveOutcome {
            registration,
            promoted,
        })
    }

    /// Admin override of a registration's status.
    ///
    /// Bypasses capacity checks on purpose. A WAITING_LIST to REGISTERED move
    /// is a manual promotion and sends the promotion notification.
    pub async fn admin_set_status(
        &self,
        registration_id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Registration> {
        let current = self
            .db
            .registrations
            .find_by_id_with_user(registration_id)
            .await?
            .ok_or(GatherlyError::RegistrationNotFound)?;

        let is_promotion = current.status == RegistrationStatus::WaitingList
            && status == RegistrationStatus::Registered;

        let updated = self.db.registrations.set_status(registration_id, status).await?;

        log_registration_transition(
            registration_id,
            current.event_id,
            current.status.as_str(),
            status.as_str(),
        );

        if is_promotion {
            let event = self.db.require_event(current.event_id).await?;
            info!(
                registration_id = %registration_id,
                event_id = %event.id,
                "Manual promotion from waiting list"
            );
            self.notifications.dispatch(
                NotificationKind::WaitingListPromoted,
                Recipient {
                    name: current.user_name.clone(),
                    email: current.user_email.clone(),
                },
                EventEmailInfo::from_event(&event, registration_id),
            );
        }

        Ok(updated)
    }
}
