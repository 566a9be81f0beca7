//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub location_map_url: Option<String>,
    pub image_url: String,
    pub instagram_url: Option<String>,
    pub event_date: DateTime<Utc>,
    pub max_capacity: Option<i32>,
    pub registration_status: EventStatus,
    pub category_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event's scheduled date is already behind us
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.event_date <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventType {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: String,
    pub location_map_url: Option<String>,
    pub image_url: String,
    pub instagram_url: Option<String>,
    pub event_date: DateTime<Utc>,
    pub max_capacity: Option<i32>,
    pub registration_status: Option<EventStatus>,
    pub category_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub location_map_url: Option<String>,
    pub image_url: Option<String>,
    pub instagram_url: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub max_capacity: Option<i32>,
    pub registration_status: Option<EventStatus>,
    pub category_id: Option<Uuid>,
}

/// Generate a URL slug from an event title
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    slug.trim_matches('-').to_string()
}
