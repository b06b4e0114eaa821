// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for the gallery password gate
// PURPOSE: Login/logout and a status view for operators

use crate::errors::TournamentError;
use crate::models::{LoginRequest, LoginResponse};
use crate::services::{GalleryService, RegistrationService, SessionStore};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

/// Bearer token from the Authorization header
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Helper function to verify admin authentication
/// DOCUMENTATION: Checks the bearer token against issued admin sessions
pub async fn verify_admin_token(req: &HttpRequest, sessions: &SessionStore) -> Result<(), TournamentError> {
    let token = bearer_token(req).ok_or_else(|| {
        log::warn!("Admin request without token");
        TournamentError::Unauthorized("Unauthorized".to_string())
    })?;

    sessions.verify(token).await.map_err(|e| {
        log::warn!("Admin request with invalid token");
        e
    })
}

/// POST /api/admin/login
pub async fn login(
    sessions: web::Data<SessionStore>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, TournamentError> {
    let token = sessions.login(&body.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        expires_in: sessions.ttl().as_secs(),
    }))
}

/// POST /api/admin/logout
pub async fn logout(
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
) -> Result<impl Responder, TournamentError> {
    verify_admin_token(&req, &sessions).await?;
    if let Some(token) = bearer_token(&req) {
        sessions.logout(token).await;
    }
    Ok(HttpResponse::Ok().json(json!({"message": "Logged out"})))
}

/// GET /api/admin/status
/// DOCUMENTATION: Gallery size, storage backend, limiter and session counters
pub async fn status(
    sessions: web::Data<SessionStore>,
    gallery: web::Data<GalleryService>,
    registrations: web::Data<RegistrationService>,
    req: HttpRequest,
) -> Result<impl Responder, TournamentError> {
    verify_admin_token(&req, &sessions).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tournament API operational",
        "photos": gallery.count().await,
        "storage": gallery.store_name(),
        "rate_limiter": registrations.limiter().stats().await,
        "sessions": sessions.stats().await,
    })))
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/status", web::get().to(status)),
    )
    .route("/api/admin-login", web::post().to(login));
}
