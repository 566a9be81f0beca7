//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{DatabasePool, EventRepository, RegistrationRepository, UserRepository};
use crate::models::*;
use crate::utils::errors::GatherlyError;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool),
        }
    }

    /// Resolve an event or fail with a typed error
    pub async fn require_event(&self, event_id: Uuid) -> Result<Event, GatherlyError> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or(GatherlyError::EventNotFound { event_id })
    }

    /// Resolve a session email to a stored user or fail with a typed error
    pub async fn require_user_by_email(&self, email: &str) -> Result<User, GatherlyError> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or(GatherlyError::UserNotFound)
    }

    /// Event detail for an admin participants view: FIFO roster plus counts
    pub async fn event_roster(
        &self,
        event_id: Uuid,
    ) -> Result<(Vec<RegistrationWithUser>, AttendanceStats), GatherlyError> {
        let roster = self.registrations.list_for_event_with_user(event_id).await?;
        let stats = self.registrations.attendance_stats(event_id).await?;

        Ok((roster, stats))
    }
}
