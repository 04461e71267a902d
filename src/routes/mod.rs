pub mod booking;
pub mod health;

use std::sync::Arc;

use crate::{config::Config, email::EmailService};

pub use booking::submit_booking;
pub use health::{health, index};

/// Process-wide state: immutable configuration plus the mail service,
/// constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub email: EmailService,
}
