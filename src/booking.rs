//! Booking submission record and validation

use std::collections::HashMap;

use axum::body::Bytes;

use crate::{config::UploadConfig, error::AppError};

/// Fields that must be present and non-empty for a submission to be valid.
pub const REQUIRED_FIELDS: [&str; 6] = ["name", "email", "phone", "address", "service", "items"];

/// One uploaded photo, held in memory for the lifetime of the request.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A validated booking form submission.
///
/// Ephemeral: constructed per request, handed to the composer, discarded
/// once the response is sent.
#[derive(Debug, Clone)]
pub struct BookingSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub service: String,
    pub items: String,
    pub comments: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub photos: Vec<PhotoUpload>,
}

impl BookingSubmission {
    /// Build a submission from the raw form fields and uploads.
    ///
    /// Required fields are checked first so no mail is composed for an
    /// incomplete form; upload limits are enforced afterwards with their own
    /// error codes. Values are trimmed, and empty optionals become `None`.
    pub fn from_form(
        mut fields: HashMap<String, String>,
        photos: Vec<PhotoUpload>,
        limits: &UploadConfig,
    ) -> Result<Self, AppError> {
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|name| {
                fields
                    .get(**name)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingFields { fields: missing });
        }

        if photos.len() > limits.max_files {
            return Err(AppError::TooManyFiles {
                count: photos.len(),
                limit: limits.max_files,
            });
        }
        for photo in &photos {
            if photo.data.len() > limits.max_file_bytes {
                return Err(AppError::FileTooLarge {
                    file_name: photo.file_name.clone(),
                    size: photo.data.len(),
                    limit: limits.max_file_bytes,
                });
            }
        }
        let total: usize = photos.iter().map(|photo| photo.data.len()).sum();
        if total > limits.max_total_bytes {
            return Err(AppError::TotalSizeTooLarge {
                total,
                limit: limits.max_total_bytes,
            });
        }

        Ok(Self {
            name: take_field(&mut fields, "name").unwrap_or_default(),
            email: take_field(&mut fields, "email").unwrap_or_default(),
            phone: take_field(&mut fields, "phone").unwrap_or_default(),
            address: take_field(&mut fields, "address").unwrap_or_default(),
            service: take_field(&mut fields, "service").unwrap_or_default(),
            items: take_field(&mut fields, "items").unwrap_or_default(),
            comments: take_field(&mut fields, "comments"),
            // Older frontends post these in camelCase
            preferred_date: take_field(&mut fields, "preferred_date")
                .or_else(|| take_field(&mut fields, "preferredDate")),
            preferred_time: take_field(&mut fields, "preferred_time")
                .or_else(|| take_field(&mut fields, "preferredTime")),
            photos,
        })
    }
}

fn take_field(fields: &mut HashMap<String, String>, key: &str) -> Option<String> {
    fields
        .remove(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
