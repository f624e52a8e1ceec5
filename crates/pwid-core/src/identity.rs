//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers and enumerations of the request
//! lifecycle. Type-level distinction prevents cross-namespace confusion —
//! you cannot pass an `EmployerId` where a `RequestId` is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

// ─── RequestId ───────────────────────────────────────────────────────

/// A request identifier in the form `REQ-<year>-<zero-padded sequence>`,
/// e.g. `REQ-2026-001`.
///
/// Identifiers are allocated from a persisted counter and never reused,
/// even after a request is deleted. Sequences below 1000 are padded to
/// three digits; larger sequences render unpadded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId {
    year: i32,
    sequence: u64,
}

impl RequestId {
    /// Build an identifier from an allocation year and sequence number.
    ///
    /// # Errors
    ///
    /// Rejects a zero sequence — allocation starts at 1.
    pub fn from_parts(year: i32, sequence: u64) -> Result<Self, CoreError> {
        if sequence == 0 {
            return Err(CoreError::Validation(
                "request sequence numbers start at 1".to_string(),
            ));
        }
        Ok(Self { year, sequence })
    }

    /// Parse the canonical `REQ-<year>-<seq>` form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let mut parts = s.splitn(3, '-');
        let (prefix, year, seq) = (parts.next(), parts.next(), parts.next());
        let (Some("REQ"), Some(year), Some(seq)) = (prefix, year, seq) else {
            return Err(CoreError::Validation(format!(
                "request id must match REQ-<year>-<seq>, got: {s:?}"
            )));
        };
        let year: i32 = year
            .parse()
            .map_err(|_| CoreError::Validation(format!("invalid year in request id: {s:?}")))?;
        let sequence: u64 = seq
            .parse()
            .map_err(|_| CoreError::Validation(format!("invalid sequence in request id: {s:?}")))?;
        Self::from_parts(year, sequence)
    }

    /// The allocation year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The sequence number within the allocation year.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "REQ-{}-{:03}", self.year, self.sequence)
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── EmployerId ──────────────────────────────────────────────────────

/// The identity of the requesting employer, either entered at login or
/// derived from a credential subject (CN, falling back to O).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployerId(String);

impl EmployerId {
    /// Create an employer identifier. Rejects empty or whitespace-only input.
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(CoreError::Validation(
                "employer id must be non-empty".to_string(),
            ));
        }
        Ok(Self(s))
    }

    /// The inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmployerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── TransactionRef ──────────────────────────────────────────────────

/// An opaque reference returned by the external submission service,
/// e.g. `0x` followed by 64 hex digits. Stored on the request at the
/// pending → submitted transition and never interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRef(pub String);

impl TransactionRef {
    /// The inner reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── AccessLevel ─────────────────────────────────────────────────────

/// Tiered scope controlling which personal-data subsets a package includes.
///
/// Higher levels are supersets: `Extended` includes everything in `Basic`,
/// `Full` includes everything in `Extended`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Name, birth date, passport, contact details.
    #[default]
    Basic,
    /// Adds education, work history, and skills.
    Extended,
    /// Adds certificates, languages, and free-form notes.
    Full,
}

impl AccessLevel {
    /// Whether this level grants at least the scope of `other`.
    pub fn includes(&self, other: AccessLevel) -> bool {
        *self >= other
    }

    /// The wire name (`basic` / `extended` / `full`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Extended => "extended",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── AuthType ────────────────────────────────────────────────────────

/// How the employer authenticated at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// A credential file was supplied; packages are encrypted for its key.
    Certificate,
    /// Login, password, and employer id were entered; packages use the
    /// symmetric path.
    Credentials,
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Certificate => "certificate",
            Self::Credentials => "credentials",
        };
        f.write_str(s)
    }
}
