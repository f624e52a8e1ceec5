//! # Content Digest — Tamper-Evidence Anchor
//!
//! Defines `ContentDigest`, the SHA-256 digest type behind `pwid_hash`.
//! The hash of a package envelope is computed once at creation and never
//! mutated; a verification center later recomputes it over the envelope it
//! received to detect substitution.
//!
//! ## Security Invariant
//!
//! `sha256_digest()` accepts only `&CanonicalBytes`, so every digest in the
//! system flows through the canonicalization pipeline. There is no way to
//! hash ad hoc serialized bytes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// A SHA-256 content digest.
///
/// Serializes as a 64-character lowercase hex string, matching the
/// `pwid_hash` wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// The raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let hex = hex.trim().to_lowercase();
        // Byte-index slicing below requires single-byte chars.
        if !hex.is_ascii() {
            return Err(CoreError::Validation(
                "content digest hex must be ASCII".to_string(),
            ));
        }
        if hex.len() != 64 {
            return Err(CoreError::Validation(format!(
                "content digest hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in bytes.iter_mut().enumerate() {
            *chunk = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
                .map_err(|e| CoreError::Validation(format!("invalid hex at {}: {e}", 2 * i)))?;
        }
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// The signature enforces that only `CanonicalBytes` can be hashed,
/// preventing any code path from computing a digest over non-canonical
/// serialization output.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Convenience wrapper returning the digest as a hex string.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}
