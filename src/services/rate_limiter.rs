// src/services/rate_limiter.rs
// DOCUMENTATION: Abuse protection for the public registration forms
// PURPOSE: Throttle repeat submissions per client, cap registrations per
// session and reject e-mail addresses that registered recently

use crate::config::Config;
use crate::errors::TournamentError;
use crate::models::RegistrationKind;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Raw attempts (valid or not) a single client may make per minute
const FLOOD_ATTEMPTS_PER_MINUTE: u32 = 20;

/// Stable, non-reversible identifier for a client.
/// Built from the first X-Forwarded-For hop (or the peer address) and the User-Agent.
pub fn client_fingerprint(forwarded_for: Option<&str>, peer_ip: Option<&str>, user_agent: &str) -> String {
    let ip = forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or(peer_ip)
        .unwrap_or("");

    let hash = blake3::hash(format!("{}:{}", ip, user_agent).as_bytes());
    hash.to_hex().as_str()[..16].to_string()
}

#[derive(Debug, Clone)]
pub struct LimiterSettings {
    /// Spacing between successful submissions to the same form
    pub window: Duration,
    /// Successful registrations allowed per session
    pub session_max: u32,
    pub session_length: Duration,
    /// Same e-mail may register once per this window
    pub email_dedup: Duration,
}

impl From<&Config> for LimiterSettings {
    fn from(config: &Config) -> Self {
        Self {
            window: Duration::from_secs(config.rate_limit_window_secs),
            session_max: config.rate_limit_session_max,
            session_length: Duration::from_secs(config.rate_limit_session_secs),
            email_dedup: Duration::from_secs(config.email_dedup_secs),
        }
    }
}

#[derive(Debug)]
struct ClientSession {
    count: u32,
    started: Instant,
}

/// Claim held by a registration between validation and delivery
#[derive(Debug)]
pub struct Reservation {
    client_id: String,
    kind: RegistrationKind,
    email: String,
    at: Instant,
}

#[derive(Debug, Default)]
struct LimiterState {
    last_submission: HashMap<(String, RegistrationKind), Instant>,
    sessions: HashMap<String, ClientSession>,
    emails: HashMap<String, Instant>,
}

/// Counters for the status endpoint
#[derive(Debug, serde::Serialize)]
pub struct LimiterStats {
    pub tracked_submissions: usize,
    pub active_sessions: usize,
    pub recent_emails: usize,
}

/// Registration limiter shared by all workers
pub struct RegistrationLimiter {
    flood: DefaultKeyedRateLimiter<String>,
    state: Mutex<LimiterState>,
    settings: LimiterSettings,
}

impl RegistrationLimiter {
    pub fn new(settings: LimiterSettings) -> Self {
        let per_minute = NonZeroU32::new(FLOOD_ATTEMPTS_PER_MINUTE).unwrap_or(NonZeroU32::MIN);
        Self {
            flood: RateLimiter::keyed(Quota::per_minute(per_minute)),
            state: Mutex::new(LimiterState::default()),
            settings,
        }
    }

    /// Reject the attempt if the client is flooding, submitted this form
    /// too recently, or used up its session allowance.
    pub async fn check(&self, client_id: &str, kind: RegistrationKind) -> Result<(), TournamentError> {
        if self.flood.check_key(&client_id.to_string()).is_err() {
            log::warn!("Flood guard tripped for client {}", client_id);
            return Err(TournamentError::RateLimited(
                "Too many requests. Please slow down.".to_string(),
            ));
        }

        self.check_at(client_id, kind, Instant::now()).await
    }

    async fn check_at(
        &self,
        client_id: &str,
        kind: RegistrationKind,
        now: Instant,
    ) -> Result<(), TournamentError> {
        let mut state = self.state.lock().await;
        self.purge(&mut state, now);
        self.admit(&state, client_id, kind, now)
    }

    /// Resubmission window and session cap, evaluated on locked state
    fn admit(
        &self,
        state: &LimiterState,
        client_id: &str,
        kind: RegistrationKind,
        now: Instant,
    ) -> Result<(), TournamentError> {
        if let Some(last) = state.last_submission.get(&(client_id.to_string(), kind)) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.settings.window {
                let wait = self.settings.window.as_secs() - elapsed.as_secs();
                log::warn!("Client {} resubmitted {} too soon", client_id, kind.endpoint());
                return Err(TournamentError::RateLimited(format!(
                    "Please wait {} seconds before submitting again",
                    wait
                )));
            }
        }

        if let Some(session) = state.sessions.get(client_id) {
            if session.count >= self.settings.session_max {
                log::warn!("Client {} reached the session registration cap", client_id);
                return Err(TournamentError::RateLimited(format!(
                    "Maximum {} registrations allowed per session. Please refresh and try later.",
                    self.settings.session_max
                )));
            }
        }

        Ok(())
    }

    /// Claim the client's window, a session slot and the e-mail address in
    /// one step. Concurrent submissions of the same form or address see the
    /// claim and are rejected. Call `release` if the registration is not
    /// delivered.
    pub async fn reserve(
        &self,
        client_id: &str,
        kind: RegistrationKind,
        email: &str,
    ) -> Result<Reservation, TournamentError> {
        self.reserve_at(client_id, kind, email, Instant::now()).await
    }

    async fn reserve_at(
        &self,
        client_id: &str,
        kind: RegistrationKind,
        email: &str,
        now: Instant,
    ) -> Result<Reservation, TournamentError> {
        let mut state = self.state.lock().await;
        self.purge(&mut state, now);
        self.admit(&state, client_id, kind, now)?;

        let email = normalize_email(email);
        if state.emails.contains_key(&email) {
            log::warn!("Duplicate {} registration for a recent e-mail", kind.label());
            return Err(TournamentError::AlreadyRegistered(
                "This email has already registered recently".to_string(),
            ));
        }

        state
            .last_submission
            .insert((client_id.to_string(), kind), now);
        state.emails.insert(email.clone(), now);
        state
            .sessions
            .entry(client_id.to_string())
            .or_insert(ClientSession { count: 0, started: now })
            .count += 1;

        Ok(Reservation {
            client_id: client_id.to_string(),
            kind,
            email,
            at: now,
        })
    }

    /// Undo a reservation whose registration failed
    pub async fn release(&self, reservation: Reservation) {
        let mut state = self.state.lock().await;
        let key = (reservation.client_id.clone(), reservation.kind);

        if state.last_submission.get(&key) == Some(&reservation.at) {
            state.last_submission.remove(&key);
        }
        if state.emails.get(&reservation.email) == Some(&reservation.at) {
            state.emails.remove(&reservation.email);
        }

        let drop_session = match state.sessions.get_mut(&reservation.client_id) {
            Some(session) => {
                session.count = session.count.saturating_sub(1);
                session.count == 0 && session.started == reservation.at
            }
            None => false,
        };
        if drop_session {
            state.sessions.remove(&reservation.client_id);
        }
    }

    /// Drop entries whose windows have passed
    pub async fn cleanup(&self) {
        let mut state = self.state.lock().await;
        let before = state.last_submission.len() + state.sessions.len() + state.emails.len();
        self.purge(&mut state, Instant::now());
        let after = state.last_submission.len() + state.sessions.len() + state.emails.len();
        self.flood.retain_recent();

        if before > after {
            log::info!("Limiter cleanup: removed {} stale entries", before - after);
        }
    }

    pub async fn stats(&self) -> LimiterStats {
        let state = self.state.lock().await;
        LimiterStats {
            tracked_submissions: state.last_submission.len(),
            active_sessions: state.sessions.len(),
            recent_emails: state.emails.len(),
        }
    }

    fn purge(&self, state: &mut LimiterState, now: Instant) {
        let settings = &self.settings;
        state
            .last_submission
            .retain(|_, at| now.saturating_duration_since(*at) < settings.window);
        state
            .sessions
            .retain(|_, s| now.saturating_duration_since(s.started) < settings.session_length);
        state
            .emails
            .retain(|_, at| now.saturating_duration_since(*at) < settings.email_dedup);
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Start background cleanup task
pub fn start_limiter_cleanup(limiter: Arc<RegistrationLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RegistrationLimiter {
        RegistrationLimiter::new(LimiterSettings {
            window: Duration::from_secs(60),
            session_max: 2,
            session_length: Duration::from_secs(3600),
            email_dedup: Duration::from_secs(86400),
        })
    }

    fn message(result: Result<(), TournamentError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_fingerprint_prefers_forwarded_for() {
        let a = client_fingerprint(Some("203.0.113.7, 10.0.0.1"), Some("10.0.0.1"), "Firefox");
        let b = client_fingerprint(Some("203.0.113.7"), None, "Firefox");
        let c = client_fingerprint(None, Some("203.0.113.7"), "Chrome");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[tokio::test]
    async fn test_resubmission_window() {
        let limiter = limiter();
        let start = Instant::now();

        assert!(limiter.check_at("c1", RegistrationKind::Player, start).await.is_ok());
        limiter
            .reserve_at("c1", RegistrationKind::Player, "a@example.com", start)
            .await
            .unwrap();

        let soon = start + Duration::from_secs(15);
        assert_eq!(
            message(limiter.check_at("c1", RegistrationKind::Player, soon).await),
            "Please wait 45 seconds before submitting again"
        );

        // Other forms and other clients are unaffected
        assert!(limiter.check_at("c1", RegistrationKind::Team, soon).await.is_ok());
        assert!(limiter.check_at("c2", RegistrationKind::Player, soon).await.is_ok());

        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at("c1", RegistrationKind::Player, later).await.is_ok());
    }

    #[tokio::test]
    async fn test_session_cap() {
        let limiter = limiter();
        let now = Instant::now();

        limiter
            .reserve_at("c1", RegistrationKind::Player, "a@example.com", now)
            .await
            .unwrap();
        limiter
            .reserve_at("c1", RegistrationKind::Team, "b@example.com", now)
            .await
            .unwrap();

        assert_eq!(
            message(limiter.check_at("c1", RegistrationKind::Sponsor, now).await),
            "Maximum 2 registrations allowed per session. Please refresh and try later."
        );
        let err = limiter
            .reserve_at("c1", RegistrationKind::Sponsor, "c@example.com", now)
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_email_dedup_is_case_insensitive() {
        let limiter = limiter();
        let now = Instant::now();

        limiter
            .reserve_at("c1", RegistrationKind::Player, " Arjun@Example.com", now)
            .await
            .unwrap();

        let err = limiter
            .reserve_at("c2", RegistrationKind::Player, "arjun@example.com", now)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This email has already registered recently");

        let next_day = now + Duration::from_secs(86401);
        assert!(limiter
            .reserve_at("c2", RegistrationKind::Player, "arjun@example.com", next_day)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_release_frees_every_claim() {
        let limiter = limiter();
        let now = Instant::now();

        let reservation = limiter
            .reserve_at("c1", RegistrationKind::Team, "captain@example.com", now)
            .await
            .unwrap();
        limiter.release(reservation).await;

        let stats = limiter.stats().await;
        assert_eq!(stats.tracked_submissions, 0);
        assert_eq!(stats.active_sessions, 0);
        assert_eq!(stats.recent_emails, 0);
        assert!(limiter
            .reserve_at("c1", RegistrationKind::Team, "captain@example.com", now)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_release_keeps_earlier_session_count() {
        let limiter = limiter();
        let now = Instant::now();

        limiter
            .reserve_at("c1", RegistrationKind::Player, "a@example.com", now)
            .await
            .unwrap();
        let reservation = limiter
            .reserve_at("c1", RegistrationKind::Sponsor, "b@example.com", now + Duration::from_secs(5))
            .await
            .unwrap();
        limiter.release(reservation).await;

        let stats = limiter.stats().await;
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.tracked_submissions, 1);
        assert_eq!(stats.recent_emails, 1);
    }

    #[tokio::test]
    async fn test_stats_after_reserve() {
        let limiter = limiter();
        limiter
            .reserve("c1", RegistrationKind::Sponsor, "sponsor@example.com")
            .await
            .unwrap();

        let stats = limiter.stats().await;
        assert_eq!(stats.tracked_submissions, 1);
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.recent_emails, 1);
    }

    #[tokio::test]
    async fn test_flood_guard() {
        let limiter = limiter();
        for _ in 0..FLOOD_ATTEMPTS_PER_MINUTE {
            assert!(limiter.check("flooder", RegistrationKind::Player).await.is_ok());
        }
        assert!(limiter.check("flooder", RegistrationKind::Player).await.is_err());
    }
}
