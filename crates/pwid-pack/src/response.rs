//! # Closure Response Packages
//!
//! When the verification center ends a request it sends back one of two
//! response shapes: an **update** carrying the hash of a newly supplied
//! package plus a redacted preview of it, or a **rejection** carrying a
//! reason code and the minimal identity the employer needs to locate the
//! candidate. Neither shape ever re-includes the candidate's personal data.
//!
//! The response is canonically serialized and encrypted for the center's
//! credential before submission; the plaintext value is also what the store
//! records as `close_data`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use pwid_core::{CanonicalBytes, ContentDigest, EmployerId, RequestId, Timestamp};
use pwid_crypto::{Credential, CredentialEncryption};
use pwid_store::Request;

use crate::envelope::{EnvelopeMetadata, PwidEnvelope};
use crate::PackError;

/// Redacted view of an updated package: context only, never the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagePreview {
    /// Context metadata of the new package.
    pub metadata: EnvelopeMetadata,
    /// The new package's encryption claim.
    pub data_encrypted: bool,
    /// When the new package was built.
    pub timestamp: Timestamp,
}

impl PackagePreview {
    /// Extract the preview fields from an envelope.
    pub fn from_envelope(envelope: &PwidEnvelope) -> Self {
        Self {
            metadata: envelope.metadata.clone(),
            data_encrypted: envelope.data_encrypted,
            timestamp: envelope.timestamp,
        }
    }
}

/// The package that terminates a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClosureResponse {
    /// The center supplied an updated package.
    Update {
        /// The request being closed.
        request_id: RequestId,
        /// Hash of the package the request was created with.
        original_pwid_hash: ContentDigest,
        /// Hash of the newly supplied package.
        new_pwid_hash: ContentDigest,
        /// When the response was built.
        timestamp: Timestamp,
        /// Operator comment, may be empty.
        comment: String,
        /// Redacted view of the new package.
        data_preview: PackagePreview,
    },
    /// The center rejected the request.
    Rejection {
        /// The request being rejected.
        request_id: RequestId,
        /// Machine-readable reason code.
        reason: String,
        /// Free-text detail for the employer.
        details: String,
        /// When the response was built.
        timestamp: Timestamp,
        /// The requesting employer.
        employer_id: EmployerId,
        /// Just enough identity to locate the candidate. Full personal
        /// data must never ride in a rejection.
        candidate_name: String,
    },
}

impl ClosureResponse {
    /// The request this response terminates.
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Update { request_id, .. } | Self::Rejection { request_id, .. } => *request_id,
        }
    }
}

/// Build the update response for a request, given the JSON of the freshly
/// supplied replacement package.
pub fn build_update_response(
    request: &Request,
    new_package_json: &str,
    comment: impl Into<String>,
) -> Result<ClosureResponse, PackError> {
    let new_package = PwidEnvelope::from_json(new_package_json)?;
    Ok(ClosureResponse::Update {
        request_id: request.id,
        original_pwid_hash: request.pwid_hash,
        new_pwid_hash: new_package.content_hash()?,
        timestamp: Timestamp::now(),
        comment: comment.into(),
        data_preview: PackagePreview::from_envelope(&new_package),
    })
}

/// Build the rejection response for a request.
pub fn build_rejection_response(
    request: &Request,
    reason: impl Into<String>,
    details: impl Into<String>,
) -> ClosureResponse {
    ClosureResponse::Rejection {
        request_id: request.id,
        reason: reason.into(),
        details: details.into(),
        timestamp: Timestamp::now(),
        employer_id: request.employer_id.clone(),
        candidate_name: request.personal_data.basic.full_name.clone(),
    }
}

/// Canonically serialize a response and encrypt it for the center's
/// credential, returning base64 ciphertext ready for submission.
pub fn encrypt_for_center(
    response: &ClosureResponse,
    credential: &Credential,
    encryption: &dyn CredentialEncryption,
) -> Result<String, PackError> {
    let plaintext = CanonicalBytes::new(response)?;
    let ciphertext = encryption.encrypt_with_recipient_key(plaintext.as_bytes(), credential)?;
    Ok(BASE64.encode(ciphertext))
}
