//! Web server assembly using Axum

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::Config,
    email::EmailService,
    routes::{AppState, health, index, submit_booking},
};

// Slack above the aggregate photo limit so the size verdict comes from the
// validator with a typed code, not from a framework rejection.
const FORM_OVERHEAD_BYTES: usize = 2 * 1024 * 1024;

/// Start the web server
pub async fn serve(config: Config, host: String, port: u16) -> anyhow::Result<()> {
    let email = EmailService::new(&config.mail)?;

    let state = AppState {
        config: Arc::new(config),
        email,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.uploads.max_total_bytes + FORM_OVERHEAD_BYTES;
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/booking", post(submit_booking))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Restrict cross-site form posts to the configured origins.
fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins = Vec::new();
    for origin in &config.server.allowed_origins {
        match origin.parse::<HeaderValue>() {
            Ok(value) => origins.push(value),
            Err(_) => warn!(origin = %origin, "Ignoring malformed CORS origin"),
        }
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
