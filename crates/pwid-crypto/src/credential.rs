//! # Credential Reading and Recipient Encryption
//!
//! A `Credential` is the PEM-shaped public credential an employer or
//! verification center supplies. The reader extracts the subject fields
//! needed for identity derivation; it deliberately does not parse DER —
//! real X.509 handling belongs to an external PKI service behind the
//! [`CredentialEncryption`] seam.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use pwid_core::error::CryptoError;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Fallback employer identity when a credential carries no usable subject.
pub const UNKNOWN_ORG: &str = "UNKNOWN_ORG";

/// A parsed PEM-shaped credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pem: String,
    info: CredentialInfo,
}

/// Identity fields extracted from a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialInfo {
    /// Credential container format label.
    pub format: String,
    /// Subject common name (`CN=`), if present.
    pub common_name: Option<String>,
    /// Subject organization (`O=`), if present.
    pub organization: Option<String>,
    /// Size of the PEM text in characters.
    pub size_chars: usize,
}

impl Credential {
    /// Parse a PEM credential, validating the BEGIN/END markers and that
    /// the body is base64-decodable.
    pub fn parse_pem(content: &str) -> Result<Self, CryptoError> {
        let begin = content.find(PEM_BEGIN).ok_or_else(|| {
            CryptoError::CredentialError("missing BEGIN CERTIFICATE marker".to_string())
        })?;
        let end = content.find(PEM_END).ok_or_else(|| {
            CryptoError::CredentialError("missing END CERTIFICATE marker".to_string())
        })?;
        if end <= begin {
            return Err(CryptoError::CredentialError(
                "END marker precedes BEGIN marker".to_string(),
            ));
        }

        let body: String = content[begin + PEM_BEGIN.len()..end]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if body.is_empty() {
            return Err(CryptoError::CredentialError("empty PEM body".to_string()));
        }
        BASE64
            .decode(body.as_bytes())
            .map_err(|e| CryptoError::CredentialError(format!("invalid PEM base64: {e}")))?;

        let info = CredentialInfo {
            format: "X.509 PEM".to_string(),
            common_name: extract_subject_field(content, "CN="),
            organization: extract_subject_field(content, "O="),
            size_chars: content.len(),
        };

        Ok(Self {
            pem: content.to_string(),
            info,
        })
    }

    /// The extracted identity fields.
    pub fn info(&self) -> &CredentialInfo {
        &self.info
    }

    /// The raw PEM text.
    pub fn as_pem(&self) -> &str {
        &self.pem
    }

    /// Derive the employer identity from the credential subject:
    /// common name, falling back to organization, falling back to
    /// [`UNKNOWN_ORG`].
    pub fn derived_identity(&self) -> String {
        self.info
            .common_name
            .clone()
            .or_else(|| self.info.organization.clone())
            .unwrap_or_else(|| UNKNOWN_ORG.to_string())
    }
}

/// Extract a `KEY=value` subject field from accompanying PEM text,
/// terminated by a comma or line end.
fn extract_subject_field(pem: &str, key: &str) -> Option<String> {
    let start = pem.find(key)? + key.len();
    let rest = &pem[start..];
    let end = rest.find([',', '\n', '\r']).unwrap_or(rest.len());
    let value = rest[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

// ─── Recipient encryption seam ───────────────────────────────────────

/// Encryption of bytes for the holder of a credential.
///
/// A production implementation parses the credential's public key and
/// performs real asymmetric encryption; the stack only depends on this
/// trait, never on a concrete PKI library.
pub trait CredentialEncryption {
    /// Encrypt `plaintext` so that only the credential holder can read it.
    fn encrypt_with_recipient_key(
        &self,
        plaintext: &[u8],
        credential: &Credential,
    ) -> Result<Vec<u8>, CryptoError>;
}

/// Identity stand-in used by demos and tests.
///
/// Returns the plaintext unchanged, matching the behavior the rest of the
/// pipeline was developed against before PKI integration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCredentialEncryption;

impl CredentialEncryption for PassthroughCredentialEncryption {
    fn encrypt_with_recipient_key(
        &self,
        plaintext: &[u8],
        _credential: &Credential,
    ) -> Result<Vec<u8>, CryptoError> {
        Ok(plaintext.to_vec())
    }
}
