//! # Personal Data Model — Tiered Profiles
//!
//! The candidate data that a package carries, organized in three tiers
//! gated by [`AccessLevel`]. The basic tier is structurally mandatory, so
//! the superset invariant "extended present ⇒ basic present" holds by
//! construction; the remaining invariant "full present ⇒ extended present"
//! is checked by [`PersonalData::tier_consistent`].

use serde::{Deserialize, Serialize};

use crate::identity::AccessLevel;

/// Basic candidate profile — always included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicProfile {
    /// Full legal name.
    pub full_name: String,
    /// Birth date as entered (`YYYY-MM-DD`).
    pub birth_date: String,
    /// Passport series and number.
    pub passport: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
}

/// Extended profile tier — education, work history, skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedProfile {
    /// Education entries, most recent first.
    pub education: Vec<String>,
    /// Employment history entries.
    pub work_history: Vec<String>,
    /// Declared skills.
    pub skills: Vec<String>,
}

/// Full profile tier — certificates, languages, free-form notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullProfile {
    /// Professional certificates.
    pub certificates: Vec<String>,
    /// Spoken languages.
    pub languages: Vec<String>,
    /// Additional free-form information.
    pub additional_info: String,
}

/// The tiered personal-data payload of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalData {
    /// Basic tier, always present.
    pub basic: BasicProfile,
    /// Extended tier, present for `extended` and `full` access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended: Option<ExtendedProfile>,
    /// Full tier, present only for `full` access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<FullProfile>,
}

impl PersonalData {
    /// Create a basic-only payload.
    pub fn basic_only(basic: BasicProfile) -> Self {
        Self {
            basic,
            extended: None,
            full: None,
        }
    }

    /// The highest access level this payload can satisfy.
    pub fn highest_tier(&self) -> AccessLevel {
        match (&self.extended, &self.full) {
            (_, Some(_)) => AccessLevel::Full,
            (Some(_), None) => AccessLevel::Extended,
            (None, None) => AccessLevel::Basic,
        }
    }

    /// Whether the tiers form a valid superset chain: a `full` tier without
    /// an `extended` tier is inconsistent.
    pub fn tier_consistent(&self) -> bool {
        !(self.full.is_some() && self.extended.is_none())
    }

    /// A copy reduced to the given access level. Tiers above the level are
    /// dropped; the basic tier always survives.
    pub fn redacted_to(&self, level: AccessLevel) -> Self {
        Self {
            basic: self.basic.clone(),
            extended: if level.includes(AccessLevel::Extended) {
                self.extended.clone()
            } else {
                None
            },
            full: if level.includes(AccessLevel::Full) {
                self.full.clone()
            } else {
                None
            },
        }
    }
}
