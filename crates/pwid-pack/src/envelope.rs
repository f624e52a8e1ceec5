//! # Package Envelope — the `.pwid` Wire Structure
//!
//! The envelope is an ephemeral value object: it is written to a `.pwid`
//! file and handed to the submission collaborator, but the store keeps only
//! its content hash. The wire form is UTF-8 JSON with this exact field set:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "format": "DOCScoin Personal Data",
//!   "timestamp": "2026-01-15T12:00:00Z",
//!   "request_id": "REQ-2026-001",
//!   "employer_id": "ACME-CORP",
//!   "data_encrypted": true,
//!   "encryption_method": "AES-GCM",
//!   "data": "<base64 ciphertext>",
//!   "signature": "<hex>",
//!   "metadata": { "access_level": "...", "purpose": "...", "created_by": "..." }
//! }
//! ```
//!
//! The signing input is the canonical JSON encoding of the base64 `data`
//! field, so signature verification needs nothing but the envelope itself
//! and the signer's public key.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use pwid_core::{
    sha256_digest, AccessLevel, CanonicalBytes, ContentDigest, EmployerId, RequestId, Timestamp,
};
use pwid_crypto::{verify_signature, PackageSignature, SigningPublicKey};

use crate::PackError;

/// Envelope format version.
pub const ENVELOPE_VERSION: &str = "1.0";
/// Envelope format label.
pub const ENVELOPE_FORMAT: &str = "DOCScoin Personal Data";
/// Producer tag recorded in envelope metadata.
pub const CREATED_BY: &str = "DOCScoin Generator";

/// How the payload was encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionMethod {
    /// Asymmetric encryption for a recipient credential.
    #[serde(rename = "RSA-OAEP")]
    RsaOaep,
    /// Symmetric content encryption with a per-package key.
    #[serde(rename = "AES-GCM")]
    AesGcm,
}

impl std::fmt::Display for EncryptionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RsaOaep => "RSA-OAEP",
            Self::AesGcm => "AES-GCM",
        };
        f.write_str(s)
    }
}

/// Context metadata carried alongside the ciphertext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    /// Data scope the package was built for.
    pub access_level: AccessLevel,
    /// Declared purpose of the request.
    pub purpose: String,
    /// Producer tag.
    pub created_by: String,
}

/// The encrypted personal-data package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PwidEnvelope {
    /// Format version, currently `"1.0"`.
    pub version: String,
    /// Format label.
    pub format: String,
    /// When the package was built.
    pub timestamp: Timestamp,
    /// The request this package belongs to.
    pub request_id: RequestId,
    /// The requesting employer.
    pub employer_id: EmployerId,
    /// Declared encryption claim. Not independently checked here.
    pub data_encrypted: bool,
    /// How `data` was encrypted.
    pub encryption_method: EncryptionMethod,
    /// Base64 ciphertext.
    pub data: String,
    /// Signature over the canonicalized `data` field.
    pub signature: PackageSignature,
    /// Context metadata.
    pub metadata: EnvelopeMetadata,
}

impl PwidEnvelope {
    /// Serialize to the pretty-printed JSON wire form written to `.pwid`
    /// files.
    pub fn to_json(&self) -> Result<String, PackError> {
        serde_json::to_string_pretty(self).map_err(|e| PackError::Envelope(e.to_string()))
    }

    /// Parse an envelope from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, PackError> {
        serde_json::from_str(json).map_err(|e| PackError::Envelope(e.to_string()))
    }

    /// The canonical content hash over the full envelope — the value the
    /// store records as `pwid_hash` at creation time.
    pub fn content_hash(&self) -> Result<ContentDigest, PackError> {
        Ok(sha256_digest(&CanonicalBytes::new(self)?))
    }

    /// Decode the base64 ciphertext.
    pub fn ciphertext(&self) -> Result<Vec<u8>, PackError> {
        Ok(BASE64.decode(self.data.as_bytes())?)
    }

    /// The canonical signing input for this envelope's ciphertext.
    pub(crate) fn signing_input(data: &str) -> Result<CanonicalBytes, PackError> {
        Ok(CanonicalBytes::new(&data)?)
    }

    /// Verify the envelope signature against its ciphertext.
    ///
    /// An envelope must pass this check before being treated as valid.
    pub fn verify(&self, public_key: &SigningPublicKey) -> Result<(), PackError> {
        let input = Self::signing_input(&self.data)?;
        verify_signature(&input, &self.signature, public_key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwid_crypto::SigningKeyPair;

    fn sample_envelope(kp: &SigningKeyPair) -> PwidEnvelope {
        let data = BASE64.encode(b"opaque-ciphertext");
        let signature = kp.sign(&PwidEnvelope::signing_input(&data).unwrap());
        PwidEnvelope {
            version: ENVELOPE_VERSION.to_string(),
            format: ENVELOPE_FORMAT.to_string(),
            timestamp: Timestamp::parse("2026-01-15T12:00:00Z").unwrap(),
            request_id: RequestId::from_parts(2026, 1).unwrap(),
            employer_id: EmployerId::new("ACME-CORP").unwrap(),
            data_encrypted: true,
            encryption_method: EncryptionMethod::AesGcm,
            data,
            signature,
            metadata: EnvelopeMetadata {
                access_level: AccessLevel::Extended,
                purpose: "background_check".to_string(),
                created_by: CREATED_BY.to_string(),
            },
        }
    }

    #[test]
    fn test_wire_field_names() {
        let kp = SigningKeyPair::generate();
        let json = sample_envelope(&kp).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in [
            "version",
            "format",
            "timestamp",
            "request_id",
            "employer_id",
            "data_encrypted",
            "encryption_method",
            "data",
            "signature",
            "metadata",
        ] {
            assert!(value.get(key).is_some(), "missing wire key {key}");
        }
        assert_eq!(value["encryption_method"], "AES-GCM");
        assert_eq!(value["metadata"]["access_level"], "extended");
        assert_eq!(value["metadata"]["created_by"], CREATED_BY);
    }

    #[test]
    fn test_json_roundtrip() {
        let kp = SigningKeyPair::generate();
        let envelope = sample_envelope(&kp);
        let parsed = PwidEnvelope::from_json(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_verify_accepts_signed_envelope() {
        let kp = SigningKeyPair::generate();
        let envelope = sample_envelope(&kp);
        envelope.verify(&kp.public_key()).expect("should verify");
    }

    #[test]
    fn test_verify_rejects_tampered_data() {
        let kp = SigningKeyPair::generate();
        let mut envelope = sample_envelope(&kp);
        envelope.data = BASE64.encode(b"substituted-ciphertext");
        assert!(envelope.verify(&kp.public_key()).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let kp = SigningKeyPair::generate();
        let envelope = sample_envelope(&kp);
        let other = SigningKeyPair::generate();
        assert!(envelope.verify(&other.public_key()).is_err());
    }

    #[test]
    fn test_content_hash_stable_across_roundtrip() {
        let kp = SigningKeyPair::generate();
        let envelope = sample_envelope(&kp);
        let hash = envelope.content_hash().unwrap();
        let parsed = PwidEnvelope::from_json(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(parsed.content_hash().unwrap(), hash);
    }

    #[test]
    fn test_content_hash_changes_with_content() {
        let kp = SigningKeyPair::generate();
        let a = sample_envelope(&kp);
        let mut b = a.clone();
        b.metadata.purpose = "employment".to_string();
        assert_ne!(a.content_hash().unwrap(), b.content_hash().unwrap());
    }

    #[test]
    fn test_ciphertext_decodes() {
        let kp = SigningKeyPair::generate();
        let envelope = sample_envelope(&kp);
        assert_eq!(envelope.ciphertext().unwrap(), b"opaque-ciphertext");
    }

    #[test]
    fn test_invalid_base64_data_rejected() {
        let kp = SigningKeyPair::generate();
        let mut envelope = sample_envelope(&kp);
        envelope.data = "!!! not base64 !!!".to_string();
        assert!(envelope.ciphertext().is_err());
    }
}
