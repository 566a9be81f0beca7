//! Services module
//!
//! This module contains the business logic services built on top of the
//! database layer.

pub mod attendance;
pub mod auth;
pub mod capacity;
pub mod notification;
pub mod promotion;
pub mod registration;
pub mod reminder;

// Re-export service types
pub use attendance::{AttendanceService, CheckInOutcome};
pub use auth::{require_admin, ScannerAuthService, ScannerClaims};
pub use notification::{EventEmailInfo, NotificationKind, NotificationService, Recipient};
pub use promotion::PromotionService;
pub use registration::{JoinOutcome, JoinPlan, LeaveOutcome, RegistrationService, RegistrationState};
pub use reminder::{ReminderRunSummary, ReminderService};

use sqlx::PgPool;

use crate::config::Settings;
use crate::database::{connection, DatabaseService};
use crate::middleware::RateLimiter;
use crate::utils::errors::Result;

/// Factory wiring every service onto one pool and one settings snapshot
#[derive(Clone)]
pub struct ServiceFactory {
    pool: PgPool,
    pub settings: Settings,
    pub db: DatabaseService,
    pub rate_limiter: RateLimiter,
    pub notifications: NotificationService,
    pub scanner_auth: ScannerAuthService,
    pub registrations: RegistrationService,
    pub promotions: PromotionService,
    pub attendance: AttendanceService,
    pub reminders: ReminderService,
}

impl ServiceFactory {
    pub fn new(pool: PgPool, settings: Settings) -> Result<Self> {
        let db = DatabaseService::new(pool.clone());
        let notifications = NotificationService::new(&settings.smtp, &settings.app)?;
        let scanner_auth = ScannerAuthService::new(&settings.auth);
        let promotions = PromotionService::new(pool.clone(), notifications.clone());
        let registrations = RegistrationService::new(
            pool.clone(),
            db.clone(),
            notifications.clone(),
            promotions.clone(),
        );
        let attendance = AttendanceService::new(pool.clone(), db.clone());
        let reminders = ReminderService::new(db.clone(), notifications.clone());

        Ok(Self {
            pool,
            settings,
            db,
            rate_limiter: RateLimiter::new(),
            notifications,
            scanner_auth,
            registrations,
            promotions,
            attendance,
            reminders,
        })
    }

    /// Liveness probe over the shared pool, for readiness and monitoring
    pub async fn health_check(&self) -> Result<()> {
        connection::health_check(&self.pool).await
    }
}
