//! Admin entry points
//!
//! Registration overrides, attendance toggling, event management and scanner
//! token issuance. Every mutation requires an admin session and burns the
//! admin rate budget; token issuance has its own tighter policy.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::event::{CreateEventRequest, Event, UpdateEventRequest};
use crate::models::registration::{
    AttendanceStats, Registration, RegistrationStatus, RegistrationWithUser,
};
use crate::models::user::SessionUser;
use crate::services::{require_admin, ServiceFactory};
use crate::utils::errors::{GatherlyError, Result};
use crate::utils::logging::log_admin_action;

pub const ACTION_ADMIN_MANAGE: &str = "admin_manage";
pub const ACTION_SCANNER_AUTH: &str = "scanner_auth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleAttendanceResponse {
    pub registration_id: Uuid,
    pub attended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerTokenResponse {
    pub token: String,
    pub expires_in_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRosterResponse {
    pub roster: Vec<RegistrationWithUser>,
    pub stats: AttendanceStats,
}

/// Override a registration's status directly
pub async fn set_registration_status(
    services: &ServiceFactory,
    client_ip: &str,
    session: Option<&SessionUser>,
    registration_id: Uuid,
    status: RegistrationStatus,
) -> Result<Registration> {
    services.rate_limiter.check(
        client_ip,
        ACTION_ADMIN_MANAGE,
        services.settings.rate_limit.admin,
    )?;
    let admin = require_admin(session)?;

    let updated = services
        .registrations
        .admin_set_status(registration_id, status)
        .await?;

    log_admin_action(
        &admin.email,
        &format!("set_registration_status:{}", status.as_str()),
        Some(&registration_id.to_string()),
    );

    Ok(updated)
}

/// Flip the attendance mark on a registration
pub async fn toggle_attendance(
    services: &ServiceFactory,
    client_ip: &str,
    session: Option<&SessionUser>,
    registration_id: Uuid,
) -> Result<ToggleAttendanceResponse> {
    services.rate_limiter.check(
        client_ip,
        ACTION_ADMIN_MANAGE,
        services.settings.rate_limit.admin,
    )?;
    let admin = require_admin(session)?;

    let current = services
        .db
        .registrations
        .find_by_id(registration_id)
        .await?
        .ok_or(GatherlyError::RegistrationNotFound)?;

    let updated = services
        .db
        .registrations
        .set_attendance(registration_id, !current.attended)
        .await?;

    log_admin_action(
        &admin.email,
        "toggle_attendance",
        Some(&registration_id.to_string()),
    );

    Ok(ToggleAttendanceResponse {
        registration_id: updated.id,
        attended: updated.attended,
    })
}

/// Create an event
pub async fn create_event(
    services: &ServiceFactory,
    client_ip: &str,
    session: Option<&SessionUser>,
    request: CreateEventRequest,
) -> Result<Event> {
    services.rate_limiter.check(
        client_ip,
        ACTION_ADMIN_MANAGE,
        services.settings.rate_limit.admin,
    )?;
    let admin = require_admin(session)?;

    let event = services.db.events.create(request).await?;
    log_admin_action(&admin.email, "create_event", Some(&event.id.to_string()));

    Ok(event)
}

/// Update an event. Raising the capacity promotes waiting entries into the
/// freed headroom; any other change leaves registrations alone.
pub async fn update_event(
    services: &ServiceFactory,
    client_ip: &str,
    session: Option<&SessionUser>,
    event_id: Uuid,
    request: UpdateEventRequest,
) -> Result<Event> {
    services.rate_limiter.check(
        client_ip,
        ACTION_ADMIN_MANAGE,
        services.settings.rate_limit.admin,
    )?;
    let admin = require_admin(session)?;

    let existing = services.db.require_event(event_id).await?;

    let capacity_raised = match (existing.max_capacity, request.max_capacity) {
        (Some(old), Some(new)) => new > old,
        // Going from unlimited to a cap frees nothing
        _ => false,
    };

    let updated = services.db.events.update(event_id, request).await?;
    log_admin_action(&admin.email, "update_event", Some(&event_id.to_string()));

    if capacity_raised {
        if let Some(new_capacity) = updated.max_capacity {
            if let Err(e) = services
                .promotions
                .promote_on_capacity_increase(event_id, new_capacity)
                .await
            {
                // The event update already committed; promotion will also run
                // on the next freed slot
                warn!(event_id = %event_id, error = %e, "Post-update promotion failed");
            }
        }
    }

    Ok(updated)
}

/// Delete an event; registrations cascade with it
pub async fn delete_event(
    services: &ServiceFactory,
    client_ip: &str,
    session: Option<&SessionUser>,
    event_id: Uuid,
) -> Result<()> {
    services.rate_limiter.check(
        client_ip,
        ACTION_ADMIN_MANAGE,
        services.settings.rate_limit.admin,
    )?;
    let admin = require_admin(session)?;

    services.db.require_event(event_id).await?;
    services.db.events.delete(event_id).await?;
    log_admin_action(&admin.email, "delete_event", Some(&event_id.to_string()));

    Ok(())
}

/// FIFO participant roster plus attendance counts for an event
pub async fn event_roster(
    services: &ServiceFactory,
    session: Option<&SessionUser>,
    event_id: Uuid,
) -> Result<EventRosterResponse> {
    require_admin(session)?;
    services.db.require_event(event_id).await?;

    let (roster, stats) = services.db.event_roster(event_id).await?;

    Ok(EventRosterResponse { roster, stats })
}

/// Issue a scanner bearer token for the signed-in admin
pub async fn issue_scanner_token(
    services: &ServiceFactory,
    client_ip: &str,
    session: Option<&SessionUser>,
) -> Result<ScannerTokenResponse> {
    services.rate_limiter.check(
        client_ip,
        ACTION_SCANNER_AUTH,
        services.settings.rate_limit.scanner_auth,
    )?;
    let admin = require_admin(session)?;

    let user = services.db.require_user_by_email(&admin.email).await?;
    let token = services.scanner_auth.issue(&user)?;

    log_admin_action(&admin.email, "issue_scanner_token", None);

    Ok(ScannerTokenResponse {
        token,
        expires_in_days: services.scanner_auth.validity_days(),
    })
}
