use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// GET / - Liveness text
pub async fn index() -> &'static str {
    "Booking intake API is running"
}

/// GET /health - Liveness probe
/// Returns 200 OK if the process is alive
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
