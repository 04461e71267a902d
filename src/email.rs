//! Outbound booking notifications: composition and dispatch

pub mod compose;
pub mod service;

pub use compose::{OutboundMessage, compose_booking_messages};
pub use service::{DispatchOutcome, EmailService, MailTransport, SmtpMailTransport};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail is not configured: {0}")]
    MissingConfig(String),

    #[error("invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("failed to render message body: {0}")]
    Render(#[from] askama::Error),

    #[error("smtp error: {0}")]
    Smtp(String),

    #[error("delivery task failed: {0}")]
    Task(String),
}
