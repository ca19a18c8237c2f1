use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use interfaces::{DeliveryOutcome, Notification, Notifier};
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, info, warn};

use crate::error::{NotifierError, Result};

pub const DEFAULT_SMTP_RELAY: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS; TLS is mandatory.
    #[default]
    StartTls,
    /// No TLS at all. Only meant for local test relays.
    None,
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub relay: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub sender: String,
    pub password: String,
    pub recipients: Vec<String>,
    /// Upper bound for the whole SMTP session, also used per command.
    pub timeout: Duration,
}

impl SmtpConfig {
    pub fn new(sender: impl Into<String>, password: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            relay: DEFAULT_SMTP_RELAY.to_string(),
            port: DEFAULT_SMTP_PORT,
            security: SmtpSecurity::StartTls,
            sender: sender.into(),
            password: password.into(),
            recipients,
            timeout: Duration::from_secs(60),
        }
    }

    /// Parse the sender and every recipient so a bad address fails at startup
    /// rather than on the first new post.
    pub fn validate(&self) -> Result<()> {
        parse_mailbox(&self.sender)?;
        for recipient in &self.recipients {
            parse_mailbox(recipient)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("relay", &self.relay)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("sender", &self.sender)
            .field("password", &"***")
            .field("recipients", &self.recipients)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address.parse().map_err(|source| NotifierError::InvalidAddress {
        address: address.to_string(),
        source,
    })
}

pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    /// Build the multipart message: a plain text part followed by the
    /// attachment as base64 encoded octet-stream.
    pub async fn build_message(&self, notification: &Notification) -> Result<Message> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.config.sender)?)
            .subject(notification.subject.as_str());
        for recipient in &self.config.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        let attachment = read_attachment(&notification.attachment).await?;
        let body = MultiPart::mixed()
            .singlepart(SinglePart::plain(notification.body.clone()))
            .singlepart(attachment);

        Ok(builder.multipart(body)?)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = match self.config.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.relay)?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.config.relay.as_str())
            }
        };

        let mut builder = builder.port(self.config.port).timeout(Some(self.config.timeout));
        if self.config.security == SmtpSecurity::StartTls || !self.config.password.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.sender.clone(),
                self.config.password.clone(),
            ));
        }

        Ok(builder.build())
    }

    pub async fn send(&self, notification: &Notification) -> Result<DeliveryOutcome> {
        if self.config.recipients.is_empty() {
            warn!("No recipients configured, skipping email '{}'", notification.subject);
            return Ok(DeliveryOutcome::Skipped);
        }

        let message = self.build_message(notification).await?;
        let mailer = self.transport()?;

        debug!(
            "Sending '{}' via {}:{} to {} recipients",
            notification.subject,
            self.config.relay,
            self.config.port,
            self.config.recipients.len()
        );

        match tokio::time::timeout(self.config.timeout, mailer.send(message)).await {
            Ok(Ok(_)) => {
                info!("Email sent successfully to {} recipients", self.config.recipients.len());
                Ok(DeliveryOutcome::Delivered {
                    recipients: self.config.recipients.len(),
                })
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(NotifierError::Timeout(self.config.timeout)),
        }
    }
}

async fn read_attachment(path: &Path) -> Result<SinglePart> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| NotifierError::Attachment {
            path: path.to_path_buf(),
            source,
        })?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    // lettre would pick 7bit for ASCII files; the attachment is always base64.
    let body = Body::new_with_encoding(content, ContentTransferEncoding::Base64)
        .map_err(|_| NotifierError::Encoding(path.to_path_buf()))?;
    let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
        .expect("static content type is valid");
    Ok(Attachment::new(filename).body(body, content_type))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<DeliveryOutcome> {
        self.send(notification).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            e.into()
        })
    }
}
