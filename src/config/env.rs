// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 5000, where the website's dev proxy points)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Password that unlocks the gallery admin tools
    pub admin_password: String,

    /// Lifetime of an issued admin token, in seconds
    pub admin_session_ttl: u64,

    /// Allowed CORS origin; empty means any origin
    pub cors_allowed_origin: String,

    /// Outbound mail settings for registration notices
    pub smtp: SmtpSettings,

    /// Vercel Blob read/write token; empty selects local storage
    pub blob_token: String,

    /// Vercel Blob API base URL
    pub blob_api_url: String,

    /// Pathname prefix for gallery blobs
    pub blob_prefix: String,

    /// Directory for locally stored uploads
    pub upload_dir: PathBuf,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,

    /// Minimum spacing between submissions to the same endpoint
    pub rate_limit_window_secs: u64,

    /// Registrations allowed per client session
    pub rate_limit_session_max: u32,

    /// Length of a client session
    pub rate_limit_session_secs: u64,

    /// An e-mail address may register once per this window
    pub email_dedup_secs: u64,
}

/// SMTP relay credentials
#[derive(Debug, Clone, Default)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// From address
    pub sender: String,
    /// Who receives the registration notices
    pub organizer: String,
}

impl SmtpSettings {
    /// True when every value needed for an authenticated send is present
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
            && !self.username.is_empty()
            && !self.password.is_empty()
            && !self.sender.is_empty()
    }
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        let smtp_username = first_var(&["SMTP_USERNAME", "SES_SMTP_USERNAME", "GMAIL_USERNAME"])
            .unwrap_or_default();
        let sender = env::var("SENDER_EMAIL").unwrap_or_else(|_| smtp_username.clone());
        let organizer = env::var("ORGANIZER_EMAIL").unwrap_or_else(|_| sender.clone());

        let smtp = SmtpSettings {
            host: first_var(&["SMTP_HOST", "SES_SMTP_HOST"])
                .unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: first_var(&["SMTP_PORT", "SES_SMTP_PORT"])
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            username: smtp_username,
            password: first_var(&["SMTP_PASSWORD", "SES_SMTP_PASSWORD", "GMAIL_APP_PASSWORD"])
                .unwrap_or_default(),
            sender,
            organizer,
        };

        Config {
            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),

            server_port: parse_var("SERVER_PORT", 5000),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),

            admin_session_ttl: parse_var("ADMIN_SESSION_TTL", 3600),

            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").unwrap_or_default(),

            smtp,

            blob_token: env::var("BLOB_READ_WRITE_TOKEN").unwrap_or_default(),

            blob_api_url: env::var("BLOB_API_URL")
                .unwrap_or_else(|_| "https://blob.vercel-storage.com".to_string()),

            blob_prefix: env::var("BLOB_PREFIX").unwrap_or_else(|_| "onamrage25/".to_string()),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static/uploads")),

            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),

            rate_limit_window_secs: parse_var("RATE_LIMIT_WINDOW_SECS", 60),

            rate_limit_session_max: parse_var("RATE_LIMIT_SESSION_MAX", 5),

            rate_limit_session_secs: parse_var("RATE_LIMIT_SESSION_SECS", 3600),

            email_dedup_secs: parse_var("EMAIL_DEDUP_SECS", 86400),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.server_port == 0 {
            return Err("SERVER_PORT must be non-zero".to_string());
        }

        if self.rate_limit_window_secs == 0 || self.rate_limit_session_secs == 0 {
            return Err("Rate limit windows must be non-zero".to_string());
        }

        if self.admin_session_ttl == 0 {
            return Err("ADMIN_SESSION_TTL must be non-zero".to_string());
        }

        if !self.smtp.is_configured() {
            log::warn!("SMTP credentials not configured - registrations will fail to send");
        }

        if self.blob_token.is_empty() {
            log::warn!(
                "BLOB_READ_WRITE_TOKEN not configured - storing uploads in {}",
                self.upload_dir.display()
            );
        }

        if self.is_production() && self.admin_password == "admin123" {
            log::warn!("ADMIN_PASSWORD is the default value in production");
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn uses_blob_storage(&self) -> bool {
        !self.blob_token.is_empty()
    }

    pub fn admin_session_duration(&self) -> Duration {
        Duration::from_secs(self.admin_session_ttl)
    }
}

impl Default for Config {
    /// Development defaults, independent of the process environment
    fn default() -> Self {
        Config {
            server_address: "127.0.0.1".to_string(),
            server_port: 5000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            admin_password: "admin123".to_string(),
            admin_session_ttl: 3600,
            cors_allowed_origin: String::new(),
            smtp: SmtpSettings {
                host: "smtp.gmail.com".to_string(),
                port: 587,
                ..SmtpSettings::default()
            },
            blob_token: String::new(),
            blob_api_url: "https://blob.vercel-storage.com".to_string(),
            blob_prefix: "onamrage25/".to_string(),
            upload_dir: PathBuf::from("static/uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            rate_limit_window_secs: 60,
            rate_limit_session_max: 5,
            rate_limit_session_secs: 3600,
            email_dedup_secs: 86400,
        }
    }
}

/// First non-empty value among several alias variables
fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
