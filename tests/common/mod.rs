//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use http_body_util::BodyExt;

use booking_intake::{
    config::{Config, MailConfig, ObservabilityConfig, ServerConfig, UploadConfig},
    create_router,
    email::{EmailService, MailError, MailTransport, OutboundMessage},
    routes::AppState,
};

pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        mail: MailConfig {
            from_email: "booking@example.com".to_string(),
            from_name: "Booking Intake".to_string(),
            admin_email: "admin@example.com".to_string(),
            ..MailConfig::default()
        },
        uploads: UploadConfig::default(),
        observability: ObservabilityConfig::default(),
    }
}

/// Records every delivered message so tests can inspect the outbox.
#[derive(Default)]
pub struct RecordingTransport {
    outbox: Mutex<Vec<OutboundMessage>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.outbox.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), MailError> {
        self.outbox.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Fails deliveries to one recipient, records everything else.
#[derive(Default)]
pub struct RejectingTransport {
    pub reject_to: String,
    pub inner: RecordingTransport,
}

impl RejectingTransport {
    pub fn rejecting(reject_to: &str) -> Self {
        Self {
            reject_to: reject_to.to_string(),
            inner: RecordingTransport::default(),
        }
    }
}

#[async_trait]
impl MailTransport for RejectingTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), MailError> {
        if message.to == self.reject_to {
            return Err(MailError::Smtp("rejected by test transport".to_string()));
        }
        self.inner.deliver(message).await
    }
}

/// Fails every delivery.
pub struct AlwaysFailingTransport;

#[async_trait]
impl MailTransport for AlwaysFailingTransport {
    async fn deliver(&self, _message: &OutboundMessage) -> Result<(), MailError> {
        Err(MailError::Smtp("connection refused".to_string()))
    }
}

/// Never completes; exercises the dispatch deadline.
pub struct StalledTransport;

#[async_trait]
impl MailTransport for StalledTransport {
    async fn deliver(&self, _message: &OutboundMessage) -> Result<(), MailError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

pub fn test_app(transport: Arc<dyn MailTransport>) -> Router {
    test_app_with_config(test_config(), transport)
}

pub fn test_app_with_config(config: Config, transport: Arc<dyn MailTransport>) -> Router {
    let email = EmailService::with_transport(&config.mail, transport);
    create_router(AppState {
        config: Arc::new(config),
        email,
    })
}

pub fn jane_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Jane Doe"),
        ("email", "jane@example.com"),
        ("phone", "555-1234"),
        ("address", "12 Main St"),
        ("service", "Carpet"),
        ("items", "2 rugs"),
    ]
}

/// Hand-build a multipart/form-data body; files land under the `photos`
/// field.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (file_name, content_type, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photos\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn booking_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/booking")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn response_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
