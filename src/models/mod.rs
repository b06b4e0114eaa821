// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod auth;
pub mod photo;
pub mod registration;

pub use auth::*;
pub use photo::*;
pub use registration::*;
