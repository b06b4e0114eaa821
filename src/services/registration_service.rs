// src/services/registration_service.rs
// DOCUMENTATION: Business logic for tournament registrations
// PURPOSE: Intermediary between handlers, the limiter and the mailer

use crate::errors::TournamentError;
use crate::models::RegistrationResponse;
use crate::services::{render_notice, validate_registration, Mailer, NoticeContent, RegistrationLimiter};
use chrono::Local;
use std::sync::Arc;

pub struct RegistrationService {
    mailer: Arc<dyn Mailer>,
    limiter: Arc<RegistrationLimiter>,
    /// Address that receives the notices
    organizer: String,
}

impl RegistrationService {
    pub fn new(mailer: Arc<dyn Mailer>, limiter: Arc<RegistrationLimiter>, organizer: String) -> Self {
        Self {
            mailer,
            limiter,
            organizer,
        }
    }

    pub fn limiter(&self) -> &Arc<RegistrationLimiter> {
        &self.limiter
    }

    /// Validate a submission, notify the organisers and record it
    pub async fn register<R: NoticeContent + Sync>(
        &self,
        client_id: &str,
        form: &R,
    ) -> Result<RegistrationResponse, TournamentError> {
        let kind = R::KIND;

        self.limiter.check(client_id, kind).await?;
        validate_registration(form)?;

        // Held across the send so a concurrent duplicate is turned away
        let (_, email) = form.email();
        let reservation = self.limiter.reserve(client_id, kind, email).await?;

        let notice = render_notice(form, Local::now());
        if let Err(e) = self.mailer.send(&self.organizer, &notice.subject, &notice.html).await {
            log::error!("Error sending {} registration email: {}", kind.label(), e);
            self.limiter.release(reservation).await;
            return Err(TournamentError::NotificationFailed);
        }

        log::info!("{} registration accepted", kind.label());

        Ok(RegistrationResponse::success())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::services::{MailError, Mailer};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Sent message as (to, subject, html)
    pub type SentMail = (String, String, String);

    /// Mailer that keeps messages in memory, or fails every send
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<SentMail>>,
        pub fail: bool,
        /// Simulated SMTP round trip
        pub delay: Duration,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(MailError::Transport("connection refused".to_string()));
            }
            self.sent
                .lock()
                .await
                .push((to.to_string(), subject.to_string(), html.to_string()));
            Ok(())
        }
    }
}
