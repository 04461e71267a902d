//! Booking form intake endpoint

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use tracing::info;

use crate::{
    booking::{BookingSubmission, PhotoUpload},
    email::compose_booking_messages,
    error::AppError,
    routes::AppState,
};

/// Multipart field under which the frontend posts photo files.
pub const PHOTOS_FIELD: &str = "photos";

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub success: bool,
}

/// POST /api/booking
///
/// Validates the submission, composes the admin and client notifications,
/// and dispatches them under the configured discipline. Under the
/// background discipline the 200 response only acknowledges that the
/// submission was accepted, not that mail was delivered.
#[tracing::instrument(skip_all)]
pub async fn submit_booking(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BookingResponse>, AppError> {
    let (fields, photos) = read_booking_form(multipart).await?;
    let submission = BookingSubmission::from_form(fields, photos, &state.config.uploads)?;

    info!(
        name = %submission.name,
        email = %submission.email,
        service = %submission.service,
        photos = submission.photos.len(),
        "New booking request"
    );

    let (admin, client) = compose_booking_messages(&submission, &state.config.mail)?;
    state.email.dispatch(admin, client).await?;

    Ok(Json(BookingResponse { success: true }))
}

async fn read_booking_form(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Vec<PhotoUpload>), AppError> {
    let mut fields = HashMap::new();
    let mut photos = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == PHOTOS_FIELD {
            let file_name = field.file_name().unwrap_or("photo").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await?;
            photos.push(PhotoUpload {
                file_name,
                content_type,
                data,
            });
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    Ok((fields, photos))
}
