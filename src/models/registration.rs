// src/models/registration.rs
// DOCUMENTATION: Registration form payloads
// PURPOSE: Player, team and sponsor sign-ups as posted by the website forms

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Known playing positions offered by the player form
pub const PLAYING_POSITIONS: [&str; 5] = [
    "Goalkeeper (GK)",
    "Defender (CB/LB/RB)",
    "Midfielder (CM/CDM/CAM)",
    "Winger (LW/RW)",
    "Forward (ST/CF)",
];

/// Sponsorship tiers offered by the sponsor form
pub const SPONSORSHIP_LEVELS: [&str; 3] = ["diamond", "gold", "other"];

/// Which form a submission came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    Player,
    Team,
    Sponsor,
}

impl RegistrationKind {
    /// Path segment used for rate limiting and logging
    pub fn endpoint(&self) -> &'static str {
        match self {
            RegistrationKind::Player => "register-player",
            RegistrationKind::Team => "register-team",
            RegistrationKind::Sponsor => "register-sponsor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegistrationKind::Player => "Player",
            RegistrationKind::Team => "Team",
            RegistrationKind::Sponsor => "Sponsor",
        }
    }
}

/// Common view over the three forms so validation and notification
/// can be written once.
pub trait Registration: Validate {
    const KIND: RegistrationKind;

    /// Wire names of the fields that must be non-blank
    const REQUIRED: &'static [&'static str];

    /// Every text field as (wire name, value)
    fn fields(&self) -> Vec<(&'static str, &str)>;

    /// Contact e-mail, used for format checks and duplicate detection
    fn email(&self) -> (&'static str, &str);

    /// Contact phone number
    fn phone(&self) -> (&'static str, &str);

    fn field(&self, name: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

/// POST /api/register/player
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRegistration {
    #[validate(length(max = 100, message = "fullName too long (max 100 characters)"))]
    pub full_name: String,

    pub contact_number: String,

    #[validate(length(max = 254, message = "email too long (max 254 characters)"))]
    pub email: String,

    #[validate(length(max = 100, message = "playingPosition too long (max 100 characters)"))]
    pub playing_position: String,
}

impl PlayerRegistration {
    pub fn has_known_position(&self) -> bool {
        PLAYING_POSITIONS.contains(&self.playing_position.trim())
    }
}

impl Registration for PlayerRegistration {
    const KIND: RegistrationKind = RegistrationKind::Player;
    const REQUIRED: &'static [&'static str] =
        &["fullName", "contactNumber", "email", "playingPosition"];

    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("fullName", self.full_name.as_str()),
            ("contactNumber", self.contact_number.as_str()),
            ("email", self.email.as_str()),
            ("playingPosition", self.playing_position.as_str()),
        ]
    }

    fn email(&self) -> (&'static str, &str) {
        ("email", self.email.as_str())
    }

    fn phone(&self) -> (&'static str, &str) {
        ("contactNumber", self.contact_number.as_str())
    }
}

/// POST /api/register/team
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamRegistration {
    #[validate(length(max = 100, message = "teamName too long (max 100 characters)"))]
    pub team_name: String,

    #[validate(length(max = 100, message = "captainName too long (max 100 characters)"))]
    pub captain_name: String,

    pub captain_contact: String,

    #[validate(length(max = 254, message = "captainEmail too long (max 254 characters)"))]
    pub captain_email: String,

    /// Free text: names and positions of up to ten members
    #[validate(length(max = 2000, message = "teamMembers too long (max 2000 characters)"))]
    pub team_members: Option<String>,
}

impl Registration for TeamRegistration {
    const KIND: RegistrationKind = RegistrationKind::Team;
    const REQUIRED: &'static [&'static str] =
        &["teamName", "captainName", "captainContact", "captainEmail"];

    fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("teamName", self.team_name.as_str()),
            ("captainName", self.captain_name.as_str()),
            ("captainContact", self.captain_contact.as_str()),
            ("captainEmail", self.captain_email.as_str()),
        ];
        if let Some(members) = &self.team_members {
            fields.push(("teamMembers", members.as_str()));
        }
        fields
    }

    fn email(&self) -> (&'static str, &str) {
        ("captainEmail", self.captain_email.as_str())
    }

    fn phone(&self) -> (&'static str, &str) {
        ("captainContact", self.captain_contact.as_str())
    }
}

/// POST /api/register/sponsor
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SponsorRegistration {
    #[validate(length(max = 100, message = "companyName too long (max 100 characters)"))]
    pub company_name: String,

    pub contact_number: String,

    #[validate(length(max = 254, message = "email too long (max 254 characters)"))]
    pub email: String,

    #[validate(length(max = 20, message = "sponsorshipLevel too long (max 20 characters)"))]
    pub sponsorship_level: String,
}

impl SponsorRegistration {
    pub fn has_known_level(&self) -> bool {
        let level = self.sponsorship_level.trim().to_lowercase();
        SPONSORSHIP_LEVELS.contains(&level.as_str())
    }
}

impl Registration for SponsorRegistration {
    const KIND: RegistrationKind = RegistrationKind::Sponsor;
    const REQUIRED: &'static [&'static str] =
        &["contactNumber", "email", "companyName", "sponsorshipLevel"];

    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("companyName", self.company_name.as_str()),
            ("contactNumber", self.contact_number.as_str()),
            ("email", self.email.as_str()),
            ("sponsorshipLevel", self.sponsorship_level.as_str()),
        ]
    }

    fn email(&self) -> (&'static str, &str) {
        ("email", self.email.as_str())
    }

    fn phone(&self) -> (&'static str, &str) {
        ("contactNumber", self.contact_number.as_str())
    }
}

/// Success body shared by all registration endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub message: String,
    pub status: String,
}

impl RegistrationResponse {
    pub fn success() -> Self {
        Self {
            message: "Registration successful".to_string(),
            status: "success".to_string(),
        }
    }
}
