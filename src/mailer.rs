// src/mailer.rs

use lettre::message::{header::ContentType, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use std::time::Duration;
use thiserror::Error;

use crate::config::MailSettings;
use crate::domain::ListingSnapshot;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport failed: {0}")]
    Transport(String),
}

/// Receives every detected listing change.
pub trait Notifier {
    fn notify(&self, snapshot: &ListingSnapshot) -> Result<(), MailerError>;
}

/// Sends change mails over an implicit-TLS SMTP session.
pub struct SmtpMailer {
    from: Mailbox,
    to: Mailbox,
    subject: String,
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> Result<Self, MailerError> {
        let from = parse_mailbox(&settings.sender_email)?;
        let to = parse_mailbox(&settings.receiver_email)?;

        let transport = SmtpTransport::relay(&settings.smtp_host)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.sender_email.clone(),
                settings.app_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(settings.timeout_secs)))
            .build();

        Ok(Self {
            from,
            to,
            subject: settings.subject.clone(),
            transport,
        })
    }

    fn build_message(&self, snapshot: &ListingSnapshot) -> Result<Message, MailerError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(format_body(snapshot))
            .map_err(|e| MailerError::Build(e.to_string()))
    }
}

impl Notifier for SmtpMailer {
    fn notify(&self, snapshot: &ListingSnapshot) -> Result<(), MailerError> {
        let message = self.build_message(snapshot)?;
        self.transport
            .send(&message)
            .map_err(|e| MailerError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Plaintext body of a change mail.
pub fn format_body(snapshot: &ListingSnapshot) -> String {
    format!(
        "Price: {}\nAddress: {}\nZipcode: {}\nSQM: {}m2\nLast Updated: {}\nURL: {}\n",
        snapshot.price,
        snapshot.address,
        snapshot.zipcode,
        snapshot.surface_area,
        snapshot.observed_at_display(),
        snapshot.url,
    )
}

fn parse_mailbox(addr: &str) -> Result<Mailbox, MailerError> {
    addr.parse::<Mailbox>()
        .map_err(|e| MailerError::Address(format!("{addr}: {e}")))
}
