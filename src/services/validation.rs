// src/services/validation.rs
// DOCUMENTATION: Server-side checks for registration forms
// PURPOSE: Never trust the browser's form validation alone

use crate::errors::TournamentError;
use crate::models::Registration;
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[\d\s+\-()]{10,15}$").unwrap();
    /// Markup, script URLs and inline handlers such as onclick=
    static ref INJECTION_RE: Regex =
        Regex::new(r"(?i)[<>]|(?:java|vb)script:|\bon[a-z]+\s*=").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

pub fn contains_injection(value: &str) -> bool {
    INJECTION_RE.is_match(value)
}

/// Message of the first failing field, by field name
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<(&str, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field, message)
            })
        })
        .collect();
    messages.sort();
    messages
        .into_iter()
        .next()
        .map(|(_, m)| m)
        .unwrap_or_else(|| "Invalid input".to_string())
}

/// Validate a registration form.
/// Checks run in order and the first failure wins: required fields,
/// e-mail, phone, length caps, then markup injection.
pub fn validate_registration<R: Registration>(form: &R) -> Result<(), TournamentError> {
    for required in R::REQUIRED {
        let present = form
            .field(required)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(TournamentError::ValidationError(format!(
                "{} is required",
                required
            )));
        }
    }

    let (_, email) = form.email();
    if !is_valid_email(email) {
        return Err(TournamentError::ValidationError(
            "Invalid email format".to_string(),
        ));
    }

    let (_, phone) = form.phone();
    if !is_valid_phone(phone) {
        return Err(TournamentError::ValidationError(
            "Invalid phone number format".to_string(),
        ));
    }

    if let Err(errors) = form.validate() {
        return Err(TournamentError::ValidationError(first_message(&errors)));
    }

    for (field, value) in form.fields() {
        if contains_injection(value) {
            log::warn!(
                "Rejected {} registration: suspicious content in {}",
                R::KIND.label(),
                field
            );
            return Err(TournamentError::ValidationError(
                "Invalid characters detected".to_string(),
            ));
        }
    }

    Ok(())
}
