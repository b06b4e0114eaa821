// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod gallery_service;
pub mod notifier;
pub mod photo_store;
pub mod rate_limiter;
pub mod registration_service;
pub mod session;
pub mod validation;

pub use gallery_service::*;
pub use notifier::*;
pub use photo_store::*;
pub use rate_limiter::*;
pub use registration_service::*;
pub use session::*;
pub use validation::*;
