// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code.
/// The response body always carries the message under "error" as a plain string,
/// which is what the website's forms read on failure.
#[derive(Error, Debug)]
pub enum TournamentError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyRegistered(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("File too large (max {0} bytes)")]
    PayloadTooLarge(usize),

    #[error("{0}")]
    RateLimited(String),

    #[error("Registration failed - email not sent")]
    NotificationFailed,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),
}

impl TournamentError {
    fn code(&self) -> &'static str {
        match self {
            TournamentError::NotFound(_) => "NOT_FOUND",
            TournamentError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            TournamentError::InvalidInput(_) => "INVALID_INPUT",
            TournamentError::ValidationError(_) => "VALIDATION_ERROR",
            TournamentError::Unauthorized(_) => "UNAUTHORIZED",
            TournamentError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            TournamentError::RateLimited(_) => "RATE_LIMITED",
            TournamentError::NotificationFailed => "NOTIFICATION_FAILED",
            TournamentError::StorageError(_) => "STORAGE_ERROR",
            TournamentError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
        }
    }
}

/// Convert TournamentError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for TournamentError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": self.to_string(),
            "code": self.code(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            TournamentError::NotFound(_) => StatusCode::NOT_FOUND,
            TournamentError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            TournamentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TournamentError::ValidationError(_) => StatusCode::BAD_REQUEST,
            TournamentError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            TournamentError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            TournamentError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            TournamentError::NotificationFailed => StatusCode::INTERNAL_SERVER_ERROR,
            TournamentError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TournamentError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<std::io::Error> for TournamentError {
    fn from(e: std::io::Error) -> Self {
        log::error!("I/O failure: {}", e);
        TournamentError::StorageError(e.to_string())
    }
}

impl From<reqwest::Error> for TournamentError {
    fn from(e: reqwest::Error) -> Self {
        TournamentError::ExternalApiError(e.to_string())
    }
}
