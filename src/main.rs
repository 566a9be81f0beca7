//! Gatherly service entry point
//!
//! Boots configuration, logging, the database pool and migrations, then runs
//! the periodic jobs (rate limiter sweep, event reminder sweep) until
//! interrupted.

use std::time::Duration;

use tracing::{error, info};

use Gatherly::{
    config::Settings,
    database::connection::{self, create_pool},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    logging::init_logging(&settings.logging)?;

    info!("Starting {}...", Gatherly::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;

    // Run database migrations
    connection::run_migrations(&pool).await?;

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(pool, settings.clone())?;

    // Periodic sweep of fully-expired rate limiter keys
    let limiter = services.rate_limiter.clone();
    let sweep_interval = Duration::from_secs(settings.rate_limit.sweep_interval_secs);
    let max_window = Duration::from_secs(
        settings
            .rate_limit
            .join
            .window_secs
            .max(settings.rate_limit.admin.window_secs)
            .max(settings.rate_limit.scanner_auth.window_secs),
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            limiter.sweep(max_window);
        }
    });

    // Periodic reminder sweep for tomorrow's events
    if settings.reminder.enabled {
        let reminders = services.reminders.clone();
        let reminder_interval = Duration::from_secs(settings.reminder.interval_hours * 3600);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(reminder_interval);
            loop {
                ticker.tick().await;
                if let Err(e) = reminders.run().await {
                    error!(error = %e, "Reminder sweep failed");
                }
            }
        });
    }

    services.health_check().await?;
    info!("Gatherly is ready");

    tokio::signal::ctrl_c().await?;
    info!("Gatherly has been shut down.");

    Ok(())
}
