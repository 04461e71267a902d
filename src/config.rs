use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to submit the booking form cross-site.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// How the booking handler waits on mail delivery.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchDiscipline {
    /// Hold the HTTP response until both notifications are sent or the
    /// send timeout elapses.
    #[default]
    Synchronous,
    /// Respond as soon as validation succeeds; delivery runs detached and
    /// failures are only logged.
    Background,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    /// Sender address; must live on a domain the SMTP relay accepts.
    #[serde(default)]
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Where admin notifications for new bookings are delivered.
    #[serde(default)]
    pub admin_email: String,
    #[serde(default)]
    pub discipline: DispatchDiscipline,
    /// Deadline for the synchronous discipline, in seconds.
    #[serde(default = "default_send_timeout_seconds")]
    pub send_timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: String::new(),
            from_name: default_from_name(),
            admin_email: String::new(),
            discipline: DispatchDiscipline::default(),
            send_timeout_seconds: default_send_timeout_seconds(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Booking Intake".to_string()
}

fn default_send_timeout_seconds() -> u64 {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_files: default_max_files(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

fn default_max_file_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_files() -> usize {
    10
}

fn default_max_total_bytes() -> usize {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (BOOKING__MAIL__ADMIN_EMAIL, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Set defaults
        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.allowed_origins", Vec::<String>::new())?;

        // Load config file if path provided or CONFIG_PATH env var set
        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Try to load config file (optional - ignore if not found)
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        // Override with environment variables (BOOKING__MAIL__ADMIN_EMAIL, etc.)
        builder = builder.add_source(
            Environment::with_prefix("BOOKING")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins"),
        );

        // Also support the legacy environment variables without prefix
        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse::<i64>() {
                builder = builder.set_override("server.port", port)?;
            }
        }
        if let Ok(admin_email) = env::var("ADMIN_EMAIL") {
            builder = builder.set_override("mail.admin_email", admin_email)?;
        }
        if let Ok(sender_email) = env::var("SENDER_EMAIL") {
            builder = builder.set_override("mail.from_email", sender_email)?;
        }
        if let Ok(smtp_host) = env::var("SMTP_HOST") {
            builder = builder.set_override("mail.smtp_host", smtp_host)?;
        }
        if let Ok(smtp_username) = env::var("SMTP_USERNAME") {
            builder = builder.set_override("mail.smtp_username", smtp_username)?;
        }
        if let Ok(smtp_password) = env::var("SMTP_PASSWORD") {
            builder = builder.set_override("mail.smtp_password", smtp_password)?;
        }
        if let Ok(origins) = env::var("ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
            builder = builder.set_override("server.allowed_origins", origins)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    ///
    /// Mail settings are checked here so a missing admin address or sender
    /// identity fails loudly at startup instead of on the first doomed send.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.mail.admin_email.trim().is_empty() {
            return Err(
                "mail.admin_email is not configured; set ADMIN_EMAIL or BOOKING__MAIL__ADMIN_EMAIL"
                    .to_string(),
            );
        }
        if !self.mail.admin_email.contains('@') {
            return Err(format!(
                "mail.admin_email '{}' is not a valid address",
                self.mail.admin_email
            ));
        }
        if self.mail.from_email.trim().is_empty() {
            return Err(
                "mail.from_email is not configured; set SENDER_EMAIL or BOOKING__MAIL__FROM_EMAIL"
                    .to_string(),
            );
        }
        if !self.mail.from_email.contains('@') {
            return Err(format!(
                "mail.from_email '{}' is not a valid address",
                self.mail.from_email
            ));
        }
        if self.mail.send_timeout_seconds == 0 {
            return Err("mail.send_timeout_seconds must be greater than 0".to_string());
        }
        if self.uploads.max_files == 0 {
            return Err("uploads.max_files must be at least 1".to_string());
        }
        if self.uploads.max_file_bytes > self.uploads.max_total_bytes {
            return Err(
                "uploads.max_file_bytes must not exceed uploads.max_total_bytes".to_string(),
            );
        }
        Ok(())
    }
}
