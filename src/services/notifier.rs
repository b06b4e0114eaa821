// src/services/notifier.rs
// DOCUMENTATION: Registration notices for the organisers
// PURPOSE: Render HTML e-mails for each form and deliver them over SMTP

use crate::config::SmtpSettings;
use crate::models::{PlayerRegistration, Registration, SponsorRegistration, TeamRegistration};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

pub const TOURNAMENT_NAME: &str = "Onam Special Football Tournament 2025 - Chapter One";
const CONTACT_LINE: &str = "info@ragefootballclub.com or +91 88832 10696";
const SIGNATURE: &str = "Rage Football Academy Team";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("SMTP is not configured")]
    NotConfigured,

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Message build failed: {0}")]
    Build(String),

    #[error("Delivery failed: {0}")]
    Transport(String),
}

/// Outbound mail seam; production uses SMTP, tests record messages
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// SMTP with STARTTLS and login credentials
pub struct SmtpMailer {
    settings: SmtpSettings,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        let transport = if settings.is_configured() {
            match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host) {
                Ok(builder) => Some(
                    builder
                        .port(settings.port)
                        .credentials(Credentials::new(
                            settings.username.clone(),
                            settings.password.clone(),
                        ))
                        .build(),
                ),
                Err(e) => {
                    log::error!("Could not set up SMTP relay {}: {}", settings.host, e);
                    None
                }
            }
        } else {
            None
        };

        Self { settings, transport }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let transport = self.transport.as_ref().ok_or(MailError::NotConfigured)?;

        let message = Message::builder()
            .from(
                self.settings
                    .sender
                    .parse()
                    .map_err(|_| MailError::Address(self.settings.sender.clone()))?,
            )
            .to(to.parse().map_err(|_| MailError::Address(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        log::info!("Email successfully sent to: {}", to);
        Ok(())
    }
}

/// Subject and HTML body for an organiser notice
#[derive(Debug, Clone)]
pub struct Notice {
    pub subject: String,
    pub html: String,
}

/// Forms that know how to describe themselves in a notice
pub trait NoticeContent: Registration {
    /// Rows for the details list as (label, value)
    fn detail_rows(&self) -> Vec<(&'static str, String)>;

    /// Extra section placed after the details list
    fn extra_section(&self) -> Option<String> {
        None
    }

    fn next_steps() -> &'static [&'static str];

    fn closing() -> Option<&'static str> {
        None
    }
}

impl NoticeContent for PlayerRegistration {
    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Full Name", self.full_name.clone()),
            ("Contact Number", self.contact_number.clone()),
            ("Email", self.email.clone()),
            ("Playing Position", self.playing_position.clone()),
        ]
    }

    fn next_steps() -> &'static [&'static str] {
        &[
            "Payment details will be shared separately",
            "Tournament schedule will be communicated closer to the event",
            "Please keep your contact details updated",
        ]
    }
}

impl NoticeContent for TeamRegistration {
    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Team Name", self.team_name.clone()),
            ("Captain/Manager Name", self.captain_name.clone()),
            ("Captain Contact", self.captain_contact.clone()),
            ("Captain Email", self.captain_email.clone()),
        ]
    }

    fn extra_section(&self) -> Option<String> {
        self.team_members
            .as_deref()
            .map(str::trim)
            .filter(|members| !members.is_empty())
            .map(|members| {
                format!(
                    "<h3>Team Members:</h3>\n<p>{}</p>",
                    escape_html(members).replace('\n', "<br>")
                )
            })
    }

    fn next_steps() -> &'static [&'static str] {
        &[
            "Payment details will be shared separately",
            "Tournament schedule will be communicated closer to the event",
            "Please ensure all team members have valid ID proofs",
            "Team logo and member details can be updated if needed",
        ]
    }
}

impl NoticeContent for SponsorRegistration {
    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Company Name", self.company_name.clone()),
            ("Contact Number", self.contact_number.clone()),
            ("Email", self.email.clone()),
            ("Sponsorship Level", title_case(&self.sponsorship_level)),
        ]
    }

    fn next_steps() -> &'static [&'static str] {
        &[
            "Our team will contact you within 24-48 hours",
            "Sponsorship packages and benefits will be discussed",
            "Branding and marketing opportunities will be shared",
            "Contract and payment terms will be finalized",
        ]
    }

    fn closing() -> Option<&'static str> {
        Some("Thank you for your interest in supporting the tournament!")
    }
}

/// Render the organiser notice for a registration
pub fn render_notice<R: NoticeContent>(form: &R, received_at: DateTime<Local>) -> Notice {
    let kind = R::KIND;
    let registration_type = match kind {
        crate::models::RegistrationKind::Player => "Individual Player",
        _ => kind.label(),
    };

    let mut html = String::new();
    html.push_str("<html>\n<body>\n");
    html.push_str(&format!("<h2>New {} Registration</h2>\n", kind.label()));
    html.push_str(&format!("<p><strong>Tournament:</strong> {}</p>\n", TOURNAMENT_NAME));
    html.push_str(&format!(
        "<p><strong>Registration Type:</strong> {}</p>\n",
        registration_type
    ));

    html.push_str(&format!("<h3>{} Details:</h3>\n<ul>\n", kind.label()));
    for (label, value) in form.detail_rows() {
        html.push_str(&format!(
            "<li><strong>{}:</strong> {}</li>\n",
            label,
            escape_html(&value)
        ));
    }
    html.push_str(&format!(
        "<li><strong>Registration Time:</strong> {}</li>\n</ul>\n",
        received_at.format("%Y-%m-%d %H:%M:%S")
    ));

    if let Some(section) = form.extra_section() {
        html.push_str(&section);
        html.push('\n');
    }

    html.push_str("<h3>Next Steps:</h3>\n");
    for (i, step) in R::next_steps().iter().enumerate() {
        html.push_str(&format!("<p>{}. {}</p>\n", i + 1, step));
    }

    if let Some(closing) = R::closing() {
        html.push_str(&format!("<p>{}</p>\n", closing));
    }

    html.push_str(&format!("<p>For any queries, contact us at {}</p>\n", CONTACT_LINE));
    html.push_str(&format!("<p>Best regards,<br>{}</p>\n", SIGNATURE));
    html.push_str("</body>\n</html>\n");

    Notice {
        subject: format!("{} Registration - Onam Football Tournament 2025", kind.label()),
        html,
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// "diamond plus" -> "Diamond Plus"
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
