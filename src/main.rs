// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, storage, mailer and start HTTP server

mod config;
mod errors;
mod handlers;
mod models;
mod services;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use services::{
    build_photo_store, start_limiter_cleanup, start_session_cleanup, GalleryService, LimiterSettings,
    RegistrationLimiter, RegistrationService, SessionStore, SmtpMailer, LOCAL_UPLOAD_ROUTE,
};
use std::io;
use std::sync::Arc;

/// Interval of the limiter and session cleanup tasks
const CLEANUP_INTERVAL_SECS: u64 = 300;

fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .max_age(3600);

    if config.cors_allowed_origin.is_empty() || config.cors_allowed_origin == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(&config.cors_allowed_origin)
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting onam-tournament-api...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Photo storage and gallery catalog
    let store = build_photo_store(&config);
    if !config.uses_blob_storage() {
        std::fs::create_dir_all(&config.upload_dir)?;
    }
    let gallery = Arc::new(GalleryService::new(store));
    match gallery.import_existing().await {
        Ok(0) => {}
        Ok(count) => log::info!("Imported {} stored photos into the gallery", count),
        Err(e) => log::warn!("Could not list stored photos: {}", e),
    }
    log::info!("Gallery storage backend: {}", gallery.store_name());

    // 5. Admin sessions and registration limiter
    let sessions = Arc::new(SessionStore::new(
        config.admin_password.clone(),
        config.admin_session_duration(),
    ));
    let limiter = Arc::new(RegistrationLimiter::new(LimiterSettings::from(&config)));

    start_session_cleanup(sessions.clone(), CLEANUP_INTERVAL_SECS);
    start_limiter_cleanup(limiter.clone(), CLEANUP_INTERVAL_SECS);
    log::info!("Started cleanup tasks (interval: 5 minutes)");

    // 6. Notification mailer
    let organizer = config.smtp.organizer.clone();
    let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));
    let registrations = Arc::new(RegistrationService::new(mailer, limiter, organizer));

    // 7. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::from(gallery.clone()))
            .app_data(web::Data::from(sessions.clone()))
            .app_data(web::Data::from(registrations.clone()))
            .app_data(handlers::json_config())
            // Middleware
            .wrap(cors(&config_clone))
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::registration_config)
            .configure(handlers::gallery_config)
            .configure(handlers::admin_config)
            .service(Files::new(LOCAL_UPLOAD_ROUTE, config_clone.upload_dir.clone()))
            .service(Files::new("/static", "static"))
    })
    .bind(&server_addr)?
    .run()
    .await
}
