// src/services/session.rs
// DOCUMENTATION: Admin sessions for the gallery tools
// PURPOSE: Exchange the admin password for an expiring bearer token

use crate::errors::TournamentError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session entry with expiration
#[derive(Clone, Debug)]
struct SessionEntry {
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Issued admin tokens
/// DOCUMENTATION: Thread-safe token store with TTL
pub struct SessionStore {
    password: String,
    store: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(password: String, ttl: Duration) -> Self {
        Self {
            password,
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token when the password matches
    pub async fn login(&self, password: &str) -> Result<String, TournamentError> {
        if !constant_time_eq(password.as_bytes(), self.password.as_bytes()) {
            log::warn!("Admin login with invalid password");
            return Err(TournamentError::Unauthorized("Invalid password".to_string()));
        }

        let token = Uuid::new_v4().simple().to_string();
        let mut store = self.store.write().await;
        store.insert(
            token.clone(),
            SessionEntry {
                expires_at: Instant::now() + self.ttl,
            },
        );
        log::info!("Admin session opened ({} active)", store.len());

        Ok(token)
    }

    /// Accept only live tokens
    pub async fn verify(&self, token: &str) -> Result<(), TournamentError> {
        let store = self.store.read().await;
        match store.get(token) {
            Some(entry) if !entry.is_expired() => Ok(()),
            Some(_) => {
                log::debug!("Admin token expired");
                Err(TournamentError::Unauthorized("Session expired".to_string()))
            }
            None => Err(TournamentError::Unauthorized("Unauthorized".to_string())),
        }
    }

    /// Revoke a token; returns whether it existed
    pub async fn logout(&self, token: &str) -> bool {
        let mut store = self.store.write().await;
        store.remove(token).is_some()
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Session cleanup: removed {} expired tokens ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    pub async fn stats(&self) -> SessionStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        SessionStats {
            total_sessions: total,
            active_sessions: total - expired,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub active_sessions: usize,
}

/// Compare without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired tokens
pub fn start_session_cleanup(sessions: Arc<SessionStore>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            sessions.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_and_verify() {
        let sessions = SessionStore::new("onam2025".to_string(), Duration::from_secs(60));

        let token = sessions.login("onam2025").await.unwrap();
        assert!(sessions.verify(&token).await.is_ok());
        assert!(sessions.verify("forged").await.is_err());
    }

    #[test]
    fn test_wrong_password() {
        let sessions = SessionStore::new("onam2025".to_string(), Duration::from_secs(60));
        let err = tokio_test::block_on(sessions.login("onam2024")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid password");
    }

    #[tokio::test]
    async fn test_token_expiration() {
        let sessions = SessionStore::new("pw".to_string(), Duration::from_secs(1));
        let token = sessions.login("pw").await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(sessions.verify(&token).await.is_err());
        sessions.cleanup().await;
        assert_eq!(sessions.stats().await.total_sessions, 0);
    }

    #[tokio::test]
    async fn test_logout_revokes() {
        let sessions = SessionStore::new("pw".to_string(), Duration::from_secs(60));
        let token = sessions.login("pw").await.unwrap();

        assert!(sessions.logout(&token).await);
        assert!(!sessions.logout(&token).await);
        assert!(sessions.verify(&token).await.is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
