//! Event reminder sweep
//!
//! Periodic job that mails every REGISTERED participant of events taking
//! place tomorrow. Delivery is awaited per recipient so the run summary
//! reflects what actually went out; individual failures are logged and do not
//! stop the sweep.

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{info, warn};

use crate::database::DatabaseService;
use crate::services::notification::{EventEmailInfo, NotificationKind, NotificationService, Recipient};
use crate::utils::errors::Result;

/// UTC window covering the next calendar day
pub fn next_day_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tomorrow = now.date_naive() + chrono::Duration::days(1);
    let start = tomorrow.and_time(NaiveTime::MIN).and_utc();
    let end = (tomorrow + chrono::Duration::days(1))
        .and_time(NaiveTime::MIN)
        .and_utc();
    (start, end)
}

/// What one sweep did
#[derive(Debug, Clone, Default)]
pub struct ReminderRunSummary {
    pub events_processed: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
}

#[derive(Clone)]
pub struct ReminderService {
    db: DatabaseService,
    notifications: NotificationService,
}

impl ReminderService {
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Run one sweep over tomorrow's events
    pub async fn run(&self) -> Result<ReminderRunSummary> {
        let (start, end) = next_day_window(Utc::now());
        let events = self.db.events.find_between(start, end).await?;

        let mut summary = ReminderRunSummary {
            events_processed: events.len(),
            ..Default::default()
        };

        for event in &events {
            let participants = self.db.registrations.list_registered_with_user(event.id).await?;

            for participant in participants {
                let result = self
                    .notifications
                    .send(
                        NotificationKind::EventReminder,
                        &Recipient {
                            name: participant.user_name.clone(),
                            email: participant.user_email.clone(),
                        },
                        &EventEmailInfo::from_event(event, participant.id),
                    )
                    .await;

                match result {
                    Ok(()) => summary.emails_sent += 1,
                    Err(e) => {
                        summary.emails_failed += 1;
                        warn!(
                            event_id = %event.id,
                            recipient = %participant.user_email,
                            error = %e,
                            "Reminder delivery failed"
                        );
                    }
                }
            }
        }

        info!(
            events = summary.events_processed,
            sent = summary.emails_sent,
            failed = summary.emails_failed,
            "Reminder sweep finished"
        );

        Ok(summary)
    }
}
