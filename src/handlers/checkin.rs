//! Scan check-in entry point
//!
//! The scanner presents its bearer token on every call; the token is verified
//! before the registration is touched. The scanned QR payload is the
//! registration id itself.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::registration::Registration;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

pub const ACTION_CHECK_IN: &str = "check_in";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub registration: Registration,
    pub message: String,
}

/// Check in a scanned registration
pub async fn check_in(
    services: &ServiceFactory,
    client_ip: &str,
    bearer_token: &str,
    registration_id: Uuid,
) -> Result<CheckInResponse> {
    services.rate_limiter.check(
        client_ip,
        ACTION_CHECK_IN,
        services.settings.rate_limit.admin,
    )?;
    services.scanner_auth.verify(bearer_token)?;

    let outcome = services.attendance.check_in(registration_id).await?;

    Ok(CheckInResponse {
        registration: outcome.registration,
        message: outcome.message,
    })
}
