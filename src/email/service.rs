//! Mail dispatch over SMTP using lettre

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Attachment, Mailbox, MultiPart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{MailError, OutboundMessage};
use crate::booking::PhotoUpload;
use crate::config::{DispatchDiscipline, MailConfig};
use crate::error::AppError;

/// Async delivery backend.
///
/// Implement this trait to plug in an alternative provider (an HTTP email
/// API, a recording double for tests).
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

/// Production transport over lettre's async SMTP client.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|_| MailError::InvalidAddress(config.from_email.clone()))?;

        let transport = if config.smtp_username.is_empty() || config.smtp_password.is_empty() {
            info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                "SMTP credentials not configured, using unauthenticated connection (e.g., MailDev)"
            );
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build()
        } else {
            // relay() uses STARTTLS, appropriate for port 587 submission
            let creds = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|err| MailError::Smtp(err.to_string()))?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self { transport, from })
    }

    fn build_message(&self, message: &OutboundMessage) -> Result<Message, MailError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| MailError::InvalidAddress(message.to.clone()))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone());

        if let Some(reply_to) = &message.reply_to {
            let reply_to: Mailbox = reply_to
                .parse()
                .map_err(|_| MailError::InvalidAddress(reply_to.clone()))?;
            builder = builder.reply_to(reply_to);
        }

        let alternative =
            MultiPart::alternative_plain_html(message.text.clone(), message.html.clone());

        let built = if message.attachments.is_empty() {
            builder.multipart(alternative)
        } else {
            let mut mixed = MultiPart::mixed().multipart(alternative);
            for photo in &message.attachments {
                mixed = mixed.singlepart(
                    Attachment::new(photo.file_name.clone())
                        .body(photo.data.to_vec(), attachment_content_type(photo)),
                );
            }
            builder.multipart(mixed)
        };

        built.map_err(|err| MailError::Build(err.to_string()))
    }
}

/// Content type from the upload, then a guess from the file name, then
/// plain bytes.
fn attachment_content_type(photo: &PhotoUpload) -> ContentType {
    ContentType::parse(&photo.content_type)
        .or_else(|_| {
            ContentType::parse(
                mime_guess::from_path(&photo.file_name)
                    .first_or_octet_stream()
                    .as_ref(),
            )
        })
        .unwrap_or(ContentType::TEXT_PLAIN)
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let email = self.build_message(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|err| MailError::Smtp(err.to_string()))?;
        Ok(())
    }
}

/// Result of a dispatch under the configured discipline.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Synchronous discipline: both sends completed before the response.
    Delivered,
    /// Background discipline: delivery continues on the detached task.
    /// Harnesses can await the handle; the request handler drops it.
    Detached(JoinHandle<()>),
}

/// Email service for booking notifications
#[derive(Clone)]
pub struct EmailService {
    transport: Arc<dyn MailTransport>,
    discipline: DispatchDiscipline,
    send_timeout: Duration,
}

impl EmailService {
    /// Create a service over the configured SMTP relay.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        if config.admin_email.trim().is_empty() {
            return Err(MailError::MissingConfig(
                "mail.admin_email is empty".to_string(),
            ));
        }
        let transport = SmtpMailTransport::new(config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a service over an alternative transport (tests, other
    /// providers).
    pub fn with_transport(config: &MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            discipline: config.discipline,
            send_timeout: Duration::from_secs(config.send_timeout_seconds),
        }
    }

    /// Send a single message through the transport.
    pub async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        self.transport.deliver(message).await
    }

    /// Dispatch the admin notification and the client confirmation under
    /// the configured discipline.
    #[tracing::instrument(skip_all, fields(discipline = ?self.discipline))]
    pub async fn dispatch(
        &self,
        admin: OutboundMessage,
        client: OutboundMessage,
    ) -> Result<DispatchOutcome, AppError> {
        match self.discipline {
            DispatchDiscipline::Synchronous => {
                let timeout_secs = self.send_timeout.as_secs();
                // The sends run on their own task: deadline expiry fails the
                // request but does not cancel an in-flight SMTP call, so a
                // late success can still double-send. Accepted risk.
                let sends = tokio::spawn({
                    let service = self.clone();
                    async move { service.send_pair(admin, client).await }
                });
                match tokio::time::timeout(self.send_timeout, sends).await {
                    Ok(Ok(result)) => {
                        result?;
                        Ok(DispatchOutcome::Delivered)
                    }
                    Ok(Err(join_err)) => {
                        Err(AppError::Dispatch(MailError::Task(join_err.to_string())))
                    }
                    Err(_) => Err(AppError::DispatchTimeout(timeout_secs)),
                }
            }
            DispatchDiscipline::Background => {
                let service = self.clone();
                let handle = tokio::spawn(async move {
                    if let Err(err) = service.send_pair(admin, client).await {
                        error!(error = %err, "Background booking dispatch failed");
                    }
                });
                Ok(DispatchOutcome::Detached(handle))
            }
        }
    }

    // Admin first; a failure on either side never suppresses the other
    // send. The first failure wins the error report.
    async fn send_pair(
        &self,
        admin: OutboundMessage,
        client: OutboundMessage,
    ) -> Result<(), MailError> {
        let admin_result = self.transport.deliver(&admin).await;
        match &admin_result {
            Ok(()) => info!(to = %admin.to, "Admin notification sent"),
            Err(err) => error!(error = %err, to = %admin.to, "Failed to send admin notification"),
        }

        let client_result = self.transport.deliver(&client).await;
        match &client_result {
            Ok(()) => info!(to = %client.to, "Client confirmation sent"),
            Err(err) => error!(error = %err, to = %client.to, "Failed to send client confirmation"),
        }

        admin_result.and(client_result)
    }
}
