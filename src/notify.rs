//! Email notification.
//!
//! Composes one message with a plain-text body and every artifact attached as
//! a PDF, then hands it to a [`Mailer`]. [`SmtpMailer`] submits to the Gmail
//! relay on the submission port, upgrading with STARTTLS and authenticating
//! with the sender's credentials.
//!
//! Failures here never undo the discovery and download work; the caller logs
//! them and the run still ends normally.

use crate::config::{MailConfig, MailSettings};
use crate::errors::NotifyError;
use crate::models::Artifact;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::SUBMISSION_PORT;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

pub const SMTP_RELAY: &str = "smtp.gmail.com";
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(60);
pub const SUBJECT_PREFIX: &str = "Diários Oficiais do Ceará";

/// Opening of every message; keyword hits are appended below it.
pub const GREETING: &str =
    "Olá,\n\nSegue(m) em anexo o(s) diário(s) oficial(is) encontrado(s) hoje.\n\n";

/// Something that can deliver a composed message.
pub trait Mailer {
    async fn submit(&self, settings: &MailSettings<'_>, message: Message) -> Result<(), NotifyError>;
}

/// Authenticated SMTP submission with STARTTLS.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    relay: String,
    port: u16,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(relay: &str) -> Self {
        Self {
            relay: relay.to_string(),
            port: SUBMISSION_PORT,
            timeout: SMTP_TIMEOUT,
        }
    }
}

impl Default for SmtpMailer {
    fn default() -> Self {
        Self::new(SMTP_RELAY)
    }
}

impl Mailer for SmtpMailer {
    #[instrument(level = "info", skip_all, fields(relay = %self.relay, port = self.port))]
    async fn submit(&self, settings: &MailSettings<'_>, message: Message) -> Result<(), NotifyError> {
        let t0 = Instant::now();
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.relay)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(
                settings.sender.to_string(),
                settings.password.to_string(),
            ))
            .timeout(Some(self.timeout))
            .build();

        let response = transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        debug!(
            code = %response.code(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Relay accepted message"
        );
        Ok(())
    }
}

/// Subject line for a run on `today`.
pub fn subject(today: NaiveDate) -> String {
    format!("{} - {}", SUBJECT_PREFIX, today.format("%d/%m/%Y"))
}

/// Build the message: plain-text `body` followed by one PDF part per artifact.
pub fn compose(
    settings: &MailSettings<'_>,
    artifacts: &[Artifact],
    body: &str,
    today: NaiveDate,
) -> Result<Message, NotifyError> {
    let from = mailbox(settings.sender)?;
    let to = mailbox(settings.recipient)?;
    let pdf = ContentType::parse("application/pdf")
        .map_err(|e| NotifyError::ContentType(e.to_string()))?;

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(body.to_string()));
    for artifact in artifacts {
        debug!(filename = %artifact.filename, bytes = artifact.content.len(), "Attaching");
        parts = parts.singlepart(
            Attachment::new(artifact.filename.clone()).body(artifact.content.clone(), pdf.clone()),
        );
    }

    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(subject(today))
        .multipart(parts)?)
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

/// Compose and deliver the notification.
///
/// # Errors
///
/// - [`NotifyError::Config`] when mail settings are missing; the mailer is not
///   called in that case
/// - address, build or transport errors otherwise
#[instrument(level = "info", skip_all, fields(attachments = artifacts.len(), %today))]
pub async fn send<M: Mailer>(
    mailer: &M,
    config: &MailConfig,
    artifacts: &[Artifact],
    body: &str,
    today: NaiveDate,
) -> Result<(), NotifyError> {
    let settings = config.require()?;
    let message = compose(&settings, artifacts, body, today)?;
    mailer.submit(&settings, message).await?;
    info!(recipient = %settings.recipient, "Email sent");
    Ok(())
}
