// src/models/auth.rs

use serde::{Deserialize, Serialize};

/// Body of POST /api/admin/login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}
