//! Notification service implementation
//!
//! Email notifications triggered by registration state transitions, delivered
//! through an SMTP relay. Transitions never wait on delivery: callers use
//! `dispatch`, which spawns the send and logs failures on its own channel.

use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{AppConfig, SmtpConfig};
use crate::models::event::Event;
use crate::utils::errors::{GatherlyError, Result};

/// What happened to the registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    RegistrationConfirmed,
    WaitingListJoined,
    WaitingListPromoted,
    EventReminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RegistrationConfirmed => "registration-confirmed",
            NotificationKind::WaitingListJoined => "waiting-list-joined",
            NotificationKind::WaitingListPromoted => "waiting-list-promoted",
            NotificationKind::EventReminder => "reminder",
        }
    }

    /// Waiting-list mail carries no ticket; everything else embeds the QR code
    fn includes_ticket(&self) -> bool {
        !matches!(self, NotificationKind::WaitingListJoined)
    }
}

/// Addressee of a notification
#[derive(Debug, Clone)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// Event details carried into the email body
#[derive(Debug, Clone)]
pub struct EventEmailInfo {
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub image_url: String,
    pub registration_id: Uuid,
}

impl EventEmailInfo {
    pub fn from_event(event: &Event, registration_id: Uuid) -> Self {
        Self {
            title: event.title.clone(),
            event_date: event.event_date,
            location: event.location.clone(),
            image_url: event.image_url.clone(),
            registration_id,
        }
    }
}

/// Notification service for outbound email
#[derive(Clone)]
pub struct NotificationService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_header: String,
    community_name: String,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(smtp: &SmtpConfig, app: &AppConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .map_err(|e| GatherlyError::Email(format!("SMTP relay error: {e}")))?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from_header: format!("{} <{}>", app.community_name, smtp.from_email),
            community_name: app.community_name.clone(),
        })
    }

    /// Fire-and-forget delivery: spawn the send and log the outcome.
    ///
    /// Used after a state transition commits; a relay failure must never roll
    /// back or delay the transition that triggered it.
    pub fn dispatch(&self, kind: NotificationKind, recipient: Recipient, event: EventEmailInfo) {
        let service = self.clone();
        tokio::spawn(async move {
            match service.send(kind, &recipient, &event).await {
                Ok(()) => {
                    info!(
                        kind = kind.as_str(),
                        recipient = %recipient.email,
                        event_title = %event.title,
                        "Notification sent"
                    );
                }
                Err(e) => {
                    error!(
                        kind = kind.as_str(),
                        recipient = %recipient.email,
                        event_title = %event.title,
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        });
    }

    /// Send a notification and wait for the relay's response
    pub async fn send(
        &self,
        kind: NotificationKind,
        recipient: &Recipient,
        event: &EventEmailInfo,
    ) -> Result<()> {
        let email = Message::builder()
            .from(
                self.from_header
                    .parse()
                    .map_err(|e| GatherlyError::Email(format!("Invalid from address: {e}")))?,
            )
            .to(format!("{} <{}>", recipient.name, recipient.email)
                .parse()
                .map_err(|e| GatherlyError::Email(format!("Invalid to address: {e}")))?)
            .subject(self.subject(kind, &event.title))
            .header(ContentType::TEXT_HTML)
            .body(self.render_html(kind, recipient, event))
            .map_err(|e| GatherlyError::Email(format!("Failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| GatherlyError::Email(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    /// Subject line per notification kind
    pub fn subject(&self, kind: NotificationKind, event_title: &str) -> String {
        match kind {
            NotificationKind::RegistrationConfirmed => {
                format!("Registration confirmed: {} - {}", event_title, self.community_name)
            }
            NotificationKind::WaitingListJoined => {
                format!("[Waiting List] {} - {}", event_title, self.community_name)
            }
            NotificationKind::WaitingListPromoted => {
                format!("You're in! {} - {}", event_title, self.community_name)
            }
            NotificationKind::EventReminder => {
                format!("Reminder: {} is tomorrow - {}", event_title, self.community_name)
            }
        }
    }

    /// Render the HTML body for a notification
    pub fn render_html(
        &self,
        kind: NotificationKind,
        recipient: &Recipient,
        event: &EventEmailInfo,
    ) -> String {
        let date_formatted = event.event_date.format("%A, %e %B %Y %H:%M UTC").to_string();

        let intro = match kind {
            NotificationKind::RegistrationConfirmed => {
                "Thank you for registering! Here are your event details:".to_string()
            }
            NotificationKind::WaitingListJoined => {
                "You are on the <strong>waiting list</strong> for this event. \
                 We will let you know as soon as a slot opens up."
                    .to_string()
            }
            NotificationKind::WaitingListPromoted => {
                "A slot has opened up and you are now <strong>registered</strong> \
                 for this event. See you there!"
                    .to_string()
            }
            NotificationKind::EventReminder => {
                "Just a reminder that this event takes place tomorrow:".to_string()
            }
        };

        let ticket_section = if kind.includes_ticket() {
            format!(
                r#"
        <div style="text-align: center; margin: 30px 0;">
            <p style="margin-bottom: 15px;"><strong>QR Code Ticket</strong></p>
            <p style="font-size: 12px; color: #666;">Show this QR code at the venue to check in</p>
            <img src="{qr_url}" alt="QR Code Ticket" style="border: 1px solid #ddd; padding: 10px; background: white; border-radius: 8px;" />
            <p style="font-size: 11px; color: #999; margin-top: 10px;">ID: {registration_id}</p>
        </div>"#,
                qr_url = qr_code_url(event.registration_id),
                registration_id = event.registration_id,
            )
        } else {
            String::new()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #f9f9f9; padding: 30px; border: 1px solid #e0e0e0; border-radius: 10px;">
        <p>Hi <strong>{name}</strong>,</p>
        <p>{intro}</p>
        <div style="background: white; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #16a34a;">
            <h2 style="margin: 0 0 15px 0; color: #333;">{title}</h2>
            <p style="margin: 5px 0;"><strong>Date:</strong> {date}</p>
            <p style="margin: 5px 0;"><strong>Location:</strong> {location}</p>
        </div>
        {ticket_section}
    </div>
    <div style="background: #333; color: white; padding: 20px; border-radius: 0 0 10px 10px; text-align: center;">
        <p style="margin: 0; font-size: 14px;">&copy; {year} {community}</p>
    </div>
</body>
</html>"#,
            name = recipient.name,
            intro = intro,
            title = event.title,
            date = date_formatted,
            location = event.location,
            ticket_section = ticket_section,
            year = Utc::now().format("%Y"),
            community = self.community_name,
        )
    }
}

/// QR image URL for a ticket; the registration id is the whole payload
pub fn qr_code_url(registration_id: Uuid) -> String {
    format!(
        "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={}",
        urlencoding::encode(&registration_id.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn service() -> NotificationService {
        let settings = Settings::default();
        NotificationService::new(&settings.smtp, &settings.app).unwrap()
    }

    fn event_info() -> EventEmailInfo {
        EventEmailInfo {
            title: "Monthly Meetup".to_string(),
            event_date: Utc::now(),
            location: "Community Hall".to_string(),
            image_url: String::new(),
            registration_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_subject_per_kind() {
        let service = service();
        assert!(service
            .subject(NotificationKind::WaitingListJoined, "Meetup")
            .starts_with("[Waiting List]"));
        assert!(service
            .subject(NotificationKind::RegistrationConfirmed, "Meetup")
            .contains("Registration confirmed"));
        assert!(service
            .subject(NotificationKind::EventReminder, "Meetup")
            .contains("tomorrow"));
    }

    #[test]
    fn test_confirmed_email_embeds_qr_ticket() {
        let service = service();
        let info = event_info();
        let recipient = Recipient {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };

        let html = service.render_html(NotificationKind::RegistrationConfirmed, &recipient, &info);
        assert!(html.contains("Ada"));
        assert!(html.contains("Monthly Meetup"));
        assert!(html.contains("api.qrserver.com"));
        assert!(html.contains(&info.registration_id.to_string()));
    }

    #[test]
    fn test_waiting_list_email_has_no_ticket() {
        let service = service();
        let recipient = Recipient {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };

        let html = service.render_html(NotificationKind::WaitingListJoined, &recipient, &event_info());
        assert!(html.contains("waiting list"));
        assert!(!html.contains("api.qrserver.com"));
    }

    #[test]
    fn test_qr_code_url_encodes_payload() {
        let id = Uuid::new_v4();
        let url = qr_code_url(id);
        assert!(url.starts_with("https://api.qrserver.com/"));
        assert!(url.ends_with(&id.to_string()));
    }
}
