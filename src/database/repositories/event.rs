//! Event repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{CreateEventRequest, Event, EventStatus, EventType, UpdateEventRequest};
use crate::utils::errors::GatherlyError;

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

const EVENT_COLUMNS: &str = "id, slug, title, description, location, location_map_url, image_url, \
     instagram_url, event_date, max_capacity, registration_status, category_id, created_by, \
     created_at, updated_at";

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, GatherlyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (slug, title, description, location, location_map_url, image_url,
                                instagram_url, event_date, max_capacity, registration_status,
                                category_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(request.slug)
        .bind(request.title)
        .bind(request.description)
        .bind(request.location)
        .bind(request.location_map_url)
        .bind(request.image_url)
        .bind(request.instagram_url)
        .bind(request.event_date)
        .bind(request.max_capacity)
        .bind(request.registration_status.unwrap_or(EventStatus::Open))
        .bind(request.category_id)
        .bind(request.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, GatherlyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, GatherlyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event
    pub async fn update(&self, id: Uuid, request: UpdateEventRequest) -> Result<Event, GatherlyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                location_map_url = COALESCE($5, location_map_url),
                image_url = COALESCE($6, image_url),
                instagram_url = COALESCE($7, instagram_url),
                event_date = COALESCE($8, event_date),
                max_capacity = COALESCE($9, max_capacity),
                registration_status = COALESCE($10, registration_status),
                category_id = COALESCE($11, category_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.location)
        .bind(request.location_map_url)
        .bind(request.image_url)
        .bind(request.instagram_url)
        .bind(request.event_date)
        .bind(request.max_capacity)
        .bind(request.registration_status)
        .bind(request.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete event (registrations cascade)
    pub async fn delete(&self, id: Uuid) -> Result<(), GatherlyError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get upcoming events
    pub async fn get_upcoming_events(&self, limit: Option<i64>) -> Result<Vec<Event>, GatherlyError> {
        let limit = limit.unwrap_or(50);
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_date > NOW() ORDER BY event_date ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get past events, most recent first
    pub async fn get_past_events(&self, limit: Option<i64>) -> Result<Vec<Event>, GatherlyError> {
        let limit = limit.unwrap_or(50);
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_date < NOW() ORDER BY event_date DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get events scheduled within a window, used by the reminder sweep
    pub async fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, GatherlyError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_date > $1 AND event_date < $2 ORDER BY event_date ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Create an event type
    pub async fn create_event_type(
        &self,
        name: &str,
        color: Option<&str>,
    ) -> Result<EventType, GatherlyError> {
        let event_type = sqlx::query_as::<_, EventType>(
            "INSERT INTO event_types (name, color) VALUES ($1, $2) RETURNING id, name, color",
        )
        .bind(name)
        .bind(color)
        .fetch_one(&self.pool)
        .await?;

        Ok(event_type)
    }

    /// List all event types
    pub async fn list_event_types(&self) -> Result<Vec<EventType>, GatherlyError> {
        let event_types = sqlx::query_as::<_, EventType>(
            "SELECT id, name, color FROM event_types ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(event_types)
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64, GatherlyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
