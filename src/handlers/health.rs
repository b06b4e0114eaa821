// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "onam-tournament-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/api/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_on_both_paths() {
        let app = test::init_service(App::new().configure(config)).await;

        for path in ["/health", "/api/health"] {
            let resp: serde_json::Value =
                test::call_and_read_body_json(&app, test::TestRequest::get().uri(path).to_request()).await;
            assert_eq!(resp["status"], "ok");
            assert_eq!(resp["service"], "onam-tournament-api");
        }
    }
}
