//! Message composition for booking notifications
//!
//! Pure: turns a validated submission into the admin notification and the
//! client confirmation. Submitted values flow through askama's HTML
//! autoescaping, so a booking form can never inject markup into the emails.

use askama::Template;

use super::MailError;
use crate::{
    booking::{BookingSubmission, PhotoUpload},
    config::MailConfig,
};

/// Shown in place of optional fields the client left empty.
const EMPTY_PLACEHOLDER: &str = "-";

/// A composed notification, ready for the mail transport.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub attachments: Vec<PhotoUpload>,
}

#[derive(Template)]
#[template(path = "emails/booking-admin.html")]
struct AdminHtmlTemplate<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    address: &'a str,
    service: &'a str,
    items: &'a str,
    comments: &'a str,
    preferred_date: &'a str,
    preferred_time: &'a str,
    photo_count: usize,
}

#[derive(Template)]
#[template(path = "emails/booking-admin.txt")]
struct AdminTextTemplate<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    address: &'a str,
    service: &'a str,
    items: &'a str,
    comments: &'a str,
    preferred_date: &'a str,
    preferred_time: &'a str,
    photo_count: usize,
}

#[derive(Template)]
#[template(path = "emails/booking-client.html")]
struct ClientHtmlTemplate<'a> {
    name: &'a str,
    service: &'a str,
    address: &'a str,
    preferred_date: &'a str,
    preferred_time: &'a str,
}

#[derive(Template)]
#[template(path = "emails/booking-client.txt")]
struct ClientTextTemplate<'a> {
    name: &'a str,
    service: &'a str,
    address: &'a str,
    preferred_date: &'a str,
    preferred_time: &'a str,
}

/// Compose the admin notification and the client confirmation.
///
/// The admin message carries the uploaded photos and replies to the
/// submitter; the client message never carries attachments.
pub fn compose_booking_messages(
    submission: &BookingSubmission,
    mail: &MailConfig,
) -> Result<(OutboundMessage, OutboundMessage), MailError> {
    let comments = submission.comments.as_deref().unwrap_or(EMPTY_PLACEHOLDER);
    let preferred_date = submission
        .preferred_date
        .as_deref()
        .unwrap_or(EMPTY_PLACEHOLDER);
    let preferred_time = submission
        .preferred_time
        .as_deref()
        .unwrap_or(EMPTY_PLACEHOLDER);

    let admin_html = AdminHtmlTemplate {
        name: &submission.name,
        email: &submission.email,
        phone: &submission.phone,
        address: &submission.address,
        service: &submission.service,
        items: &submission.items,
        comments,
        preferred_date,
        preferred_time,
        photo_count: submission.photos.len(),
    }
    .render()?;

    let admin_text = AdminTextTemplate {
        name: &submission.name,
        email: &submission.email,
        phone: &submission.phone,
        address: &submission.address,
        service: &submission.service,
        items: &submission.items,
        comments,
        preferred_date,
        preferred_time,
        photo_count: submission.photos.len(),
    }
    .render()?;

    let client_html = ClientHtmlTemplate {
        name: &submission.name,
        service: &submission.service,
        address: &submission.address,
        preferred_date,
        preferred_time,
    }
    .render()?;

    let client_text = ClientTextTemplate {
        name: &submission.name,
        service: &submission.service,
        address: &submission.address,
        preferred_date,
        preferred_time,
    }
    .render()?;

    let admin = OutboundMessage {
        to: mail.admin_email.clone(),
        reply_to: Some(submission.email.clone()),
        subject: format!("New booking from {}", submission.name),
        html: admin_html,
        text: admin_text,
        attachments: submission.photos.clone(),
    };

    let client = OutboundMessage {
        to: submission.email.clone(),
        reply_to: None,
        subject: "We received your booking request".to_string(),
        html: client_html,
        text: client_text,
        attachments: Vec::new(),
    };

    Ok((admin, client))
}
