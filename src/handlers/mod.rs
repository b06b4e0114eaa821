// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components and shared extractor config

pub mod admin;
pub mod gallery;
pub mod health;
pub mod registration;

pub use admin::config as admin_config;
pub use gallery::config as gallery_config;
pub use health::config as health_config;
pub use registration::config as registration_config;

use crate::errors::TournamentError;
use actix_web::web;

/// Largest JSON body accepted by any endpoint
const JSON_LIMIT_BYTES: usize = 64 * 1024;

/// JSON extractor config that reports body errors in the API error format
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            log::debug!("Rejected JSON body: {}", err);
            TournamentError::InvalidInput(format!("Invalid request body: {}", err)).into()
        })
}
