//! Member-facing registration entry points
//!
//! Each entry point applies the rate limit first, then resolves the session
//! to a stored user, then delegates to the registration service. Rate limit
//! keys are the caller's IP, so anonymous and signed-in traffic share one
//! budget per address.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::registration::RegistrationStatus;
use crate::models::user::SessionUser;
use crate::services::ServiceFactory;
use crate::utils::errors::{GatherlyError, Result};

/// Join and leave share one budget, like a single form with two buttons
pub const ACTION_REGISTRATION: &str = "event_registration";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinEventResponse {
    pub registration_id: Uuid,
    pub status: RegistrationStatus,
    pub reactivated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveEventResponse {
    pub registration_id: Uuid,
    pub promoted: usize,
}

/// Join an event as the signed-in user
pub async fn join_event(
    services: &ServiceFactory,
    client_ip: &str,
    session: Option<&SessionUser>,
    event_id: Uuid,
) -> Result<JoinEventResponse> {
    services.rate_limiter.check(
        client_ip,
        ACTION_REGISTRATION,
        services.settings.rate_limit.join,
    )?;

    let session = session.ok_or(GatherlyError::NotLoggedIn)?;
    let user = services.db.require_user_by_email(&session.email).await?;

    let outcome = services.registrations.join(event_id, &user).await?;

    Ok(JoinEventResponse {
        registration_id: outcome.registration.id,
        status: outcome.registration.status,
        reactivated: outcome.reactivated,
    })
}

/// Cancel the signed-in user's registration
pub async fn leave_event(
    services: &ServiceFactory,
    client_ip: &str,
    session: Option<&SessionUser>,
    event_id: Uuid,
) -> Result<LeaveEventResponse> {
    services.rate_limiter.check(
        client_ip,
        ACTION_REGISTRATION,
        services.settings.rate_limit.join,
    )?;

    let session = session.ok_or(GatherlyError::NotLoggedIn)?;
    let user = services.db.require_user_by_email(&session.email).await?;

    let outcome = services.registrations.leave(event_id, user.id).await?;

    Ok(LeaveEventResponse {
        registration_id: outcome.registration.id,
        promoted: outcome.promoted,
    })
}
