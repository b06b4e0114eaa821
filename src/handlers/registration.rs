// src/handlers/registration.rs
// DOCUMENTATION: HTTP handlers for the registration forms
// PURPOSE: Parse requests, identify the client, call the registration service

use crate::errors::TournamentError;
use crate::models::{PlayerRegistration, SponsorRegistration, TeamRegistration};
use crate::services::{client_fingerprint, RegistrationService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

/// Fingerprint of the caller for rate limiting
pub fn client_id(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    };
    let peer_ip = req.peer_addr().map(|addr| addr.ip().to_string());

    client_fingerprint(
        header("X-Forwarded-For").as_deref(),
        peer_ip.as_deref(),
        &header("User-Agent").unwrap_or_default(),
    )
}

/// POST /api/register/player
pub async fn register_player(
    service: web::Data<RegistrationService>,
    req: HttpRequest,
    body: web::Json<PlayerRegistration>,
) -> Result<impl Responder, TournamentError> {
    let form = body.into_inner();
    if !form.playing_position.trim().is_empty() && !form.has_known_position() {
        log::info!("Player registered with custom position: {}", form.playing_position);
    }

    let response = service.register(&client_id(&req), &form).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/register/team
pub async fn register_team(
    service: web::Data<RegistrationService>,
    req: HttpRequest,
    body: web::Json<TeamRegistration>,
) -> Result<impl Responder, TournamentError> {
    let response = service.register(&client_id(&req), &body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/register/sponsor
pub async fn register_sponsor(
    service: web::Data<RegistrationService>,
    req: HttpRequest,
    body: web::Json<SponsorRegistration>,
) -> Result<impl Responder, TournamentError> {
    let form = body.into_inner();
    if !form.sponsorship_level.trim().is_empty() && !form.has_known_level() {
        log::info!("Sponsor chose unlisted level: {}", form.sponsorship_level);
    }

    let response = service.register(&client_id(&req), &form).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "healthy", "service": "registration"}))
}

/// Configuration for registration routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/register")
            .route("/player", web::post().to(register_player))
            .route("/team", web::post().to(register_team))
            .route("/sponsor", web::post().to(register_sponsor))
            .route("/health", web::get().to(health_check)),
    )
    // Paths used by the website's endpoint table
    .route("/api/register-player", web::post().to(register_player))
    .route("/api/register-team", web::post().to(register_team))
    .route("/api/register-sponsor", web::post().to(register_sponsor));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::json_config;
    use crate::services::test_support::RecordingMailer;
    use crate::services::{LimiterSettings, RegistrationLimiter};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::sync::Arc;
    use std::time::Duration;

    fn service(mailer: Arc<RecordingMailer>) -> web::Data<RegistrationService> {
        let limiter = Arc::new(RegistrationLimiter::new(LimiterSettings {
            window: Duration::from_secs(60),
            session_max: 5,
            session_length: Duration::from_secs(3600),
            email_dedup: Duration::from_secs(86400),
        }));
        web::Data::new(RegistrationService::new(mailer, limiter, "club@example.com".to_string()))
    }

    #[actix_web::test]
    async fn test_player_registration_success() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = test::init_service(
            App::new()
                .app_data(service(mailer.clone()))
                .app_data(json_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/register/player")
            .insert_header(("User-Agent", "test-browser"))
            .set_json(json!({
                "fullName": "Arjun Nair",
                "contactNumber": "9876543210",
                "email": "arjun@example.com",
                "playingPosition": "Goalkeeper (GK)"
            }))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp["message"], "Registration successful");
        assert_eq!(resp["status"], "success");
        assert_eq!(mailer.sent.lock().await.len(), 1);
    }

    #[actix_web::test]
    async fn test_team_missing_field_via_alias_path() {
        let app = test::init_service(
            App::new()
                .app_data(service(Arc::new(RecordingMailer::default())))
                .app_data(json_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/register-team")
            .set_json(json!({"teamName": "Kochi Kings", "captainName": "Ravi"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "captainContact is required");
    }

    #[actix_web::test]
    async fn test_sponsor_mail_failure_returns_500() {
        let app = test::init_service(
            App::new()
                .app_data(service(Arc::new(RecordingMailer::failing())))
                .app_data(json_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/register/sponsor")
            .set_json(json!({
                "companyName": "Malabar Traders",
                "contactNumber": "9876543210",
                "email": "sponsor@example.com",
                "sponsorshipLevel": "gold"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Registration failed - email not sent");
    }

    #[actix_web::test]
    async fn test_malformed_json_has_error_string() {
        let app = test::init_service(
            App::new()
                .app_data(service(Arc::new(RecordingMailer::default())))
                .app_data(json_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/register/player")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_registration_health() {
        let app = test::init_service(App::new().configure(config)).await;
        let resp: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/register/health").to_request(),
        )
        .await;
        assert_eq!(resp["service"], "registration");
    }
}
