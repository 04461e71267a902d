use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::email::MailError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("File '{file_name}' is {size} bytes, above the {limit} byte per-file limit")]
    FileTooLarge {
        file_name: String,
        size: usize,
        limit: usize,
    },

    #[error("{count} files uploaded, at most {limit} are allowed")]
    TooManyFiles { count: usize, limit: usize },

    #[error("Uploaded files total {total} bytes, above the {limit} byte limit")]
    TotalSizeTooLarge { total: usize, limit: usize },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Mail dispatch failed: {0}")]
    Dispatch(#[from] MailError),

    #[error("Mail dispatch timed out after {0} seconds")]
    DispatchTimeout(u64),
}

impl AppError {
    /// Machine-readable code for client-correctable failures.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::MissingFields { .. } => Some("MISSING_FIELDS"),
            AppError::FileTooLarge { .. } => Some("FILE_TOO_LARGE"),
            AppError::TooManyFiles { .. } => Some("TOO_MANY_FILES"),
            AppError::TotalSizeTooLarge { .. } => Some("TOTAL_SIZE_TOO_LARGE"),
            AppError::Upload(_) => Some("UPLOAD_ERROR"),
            AppError::Dispatch(_) | AppError::DispatchTimeout(_) => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields { .. }
            | AppError::FileTooLarge { .. }
            | AppError::TooManyFiles { .. }
            | AppError::TotalSizeTooLarge { .. }
            | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(_) | AppError::DispatchTimeout(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::Upload(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Booking request failed");
        }

        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        if let Some(code) = self.code() {
            body["code"] = json!(code);
        }

        (status, Json(body)).into_response()
    }
}
