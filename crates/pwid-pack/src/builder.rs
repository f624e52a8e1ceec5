//! # Package Builder
//!
//! Assembles a signed, encrypted envelope from an intake draft. The payload
//! is the canonical JSON of the draft's (already gated) personal data, so
//! the same candidate data always produces the same plaintext bytes.
//!
//! Two encryption paths, selected by whether a recipient credential was
//! supplied at intake:
//!
//! - **Credential path** — the payload is encrypted for the credential
//!   holder through the [`CredentialEncryption`] seam and the envelope is
//!   marked `RSA-OAEP`.
//! - **Symmetric path** — a fresh AES-256-GCM key is generated per package
//!   and returned in [`BuiltPackage::symmetric_key`]; delivering it to the
//!   decrypting party is the caller's responsibility. The engine never
//!   persists it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use pwid_core::{CanonicalBytes, ContentDigest, RequestId, Timestamp};
use pwid_crypto::{Credential, CredentialEncryption, SigningKeyPair, SymmetricKey};
use pwid_store::RequestDraft;

use crate::envelope::{
    EncryptionMethod, EnvelopeMetadata, PwidEnvelope, CREATED_BY, ENVELOPE_FORMAT,
    ENVELOPE_VERSION,
};
use crate::PackError;

/// The outcome of building one package.
#[derive(Debug)]
pub struct BuiltPackage {
    /// The signed envelope, ready to be written to a `.pwid` file.
    pub envelope: PwidEnvelope,
    /// Canonical content hash of the envelope; stored on the request.
    pub pwid_hash: ContentDigest,
    /// The content-encryption key, present only on the symmetric path.
    pub symmetric_key: Option<SymmetricKey>,
}

/// Builds request packages with an injected signer and recipient-encryption
/// collaborator.
pub struct PackageBuilder<'a> {
    signer: &'a SigningKeyPair,
    recipient_encryption: &'a dyn CredentialEncryption,
}

impl<'a> PackageBuilder<'a> {
    /// A builder over the given signer and recipient-encryption seam.
    pub fn new(
        signer: &'a SigningKeyPair,
        recipient_encryption: &'a dyn CredentialEncryption,
    ) -> Self {
        Self {
            signer,
            recipient_encryption,
        }
    }

    /// Build the package for an intake draft.
    ///
    /// `request_id` must be the identifier the store will assign to the
    /// record, so envelope and record always agree.
    pub fn build_request_package(
        &self,
        draft: &RequestDraft,
        request_id: RequestId,
        credential: Option<&Credential>,
    ) -> Result<BuiltPackage, PackError> {
        let payload = CanonicalBytes::new(&draft.personal_data)?;

        let (ciphertext, method, symmetric_key) = match credential {
            Some(credential) => {
                let ciphertext = self
                    .recipient_encryption
                    .encrypt_with_recipient_key(payload.as_bytes(), credential)?;
                (ciphertext, EncryptionMethod::RsaOaep, None)
            }
            None => {
                let key = SymmetricKey::generate();
                let ciphertext = key.encrypt(payload.as_bytes())?;
                (ciphertext, EncryptionMethod::AesGcm, Some(key))
            }
        };

        let data = BASE64.encode(&ciphertext);
        let signature = self.signer.sign(&PwidEnvelope::signing_input(&data)?);

        let envelope = PwidEnvelope {
            version: ENVELOPE_VERSION.to_string(),
            format: ENVELOPE_FORMAT.to_string(),
            timestamp: Timestamp::now(),
            request_id,
            employer_id: draft.employer_id.clone(),
            data_encrypted: true,
            encryption_method: method,
            data,
            signature,
            metadata: EnvelopeMetadata {
                access_level: draft.access_level,
                purpose: draft.purpose.clone(),
                created_by: CREATED_BY.to_string(),
            },
        };
        let pwid_hash = envelope.content_hash()?;

        tracing::debug!(
            request_id = %envelope.request_id,
            method = %envelope.encryption_method,
            "package built"
        );

        Ok(BuiltPackage {
            envelope,
            pwid_hash,
            symmetric_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwid_core::{AccessLevel, AuthType, BasicProfile, EmployerId, PersonalData};
    use pwid_crypto::PassthroughCredentialEncryption;

    fn sample_pem() -> String {
        let body = BASE64.encode(b"not-a-real-der-certificate");
        format!(
            "Subject: CN=ACME Recruiting, O=ACME Corp\n\
             -----BEGIN CERTIFICATE-----\n{body}\n-----END CERTIFICATE-----\n"
        )
    }

    fn draft() -> RequestDraft {
        RequestDraft {
            employer_id: EmployerId::new("ACME-CORP").unwrap(),
            auth_type: AuthType::Credentials,
            purpose: "background_check".to_string(),
            access_level: AccessLevel::Basic,
            comment: String::new(),
            personal_data: PersonalData::basic_only(BasicProfile {
                full_name: "Ivan Ivanov".to_string(),
                birth_date: "1990-04-02".to_string(),
                passport: "1234 567890".to_string(),
                phone: "+7 900 000-00-00".to_string(),
                email: "ivan@example.com".to_string(),
            }),
        }
    }

    #[test]
    fn test_symmetric_path_decrypts_to_payload() {
        let signer = SigningKeyPair::generate();
        let enc = PassthroughCredentialEncryption;
        let builder = PackageBuilder::new(&signer, &enc);
        let draft = draft();
        let id = RequestId::from_parts(2026, 1).unwrap();

        let built = builder.build_request_package(&draft, id, None).unwrap();
        assert_eq!(built.envelope.encryption_method, EncryptionMethod::AesGcm);

        let key = built.symmetric_key.expect("symmetric key returned");
        let plaintext = key.decrypt(&built.envelope.ciphertext().unwrap()).unwrap();
        assert_eq!(
            plaintext,
            CanonicalBytes::new(&draft.personal_data).unwrap().as_bytes()
        );
    }

    #[test]
    fn test_credential_path_uses_recipient_seam() {
        let signer = SigningKeyPair::generate();
        let enc = PassthroughCredentialEncryption;
        let builder = PackageBuilder::new(&signer, &enc);
        let draft = draft();
        let credential = Credential::parse_pem(&sample_pem()).unwrap();
        let id = RequestId::from_parts(2026, 2).unwrap();

        let built = builder
            .build_request_package(&draft, id, Some(&credential))
            .unwrap();
        assert_eq!(built.envelope.encryption_method, EncryptionMethod::RsaOaep);
        assert!(built.symmetric_key.is_none());
        // Passthrough seam: ciphertext is the canonical payload itself.
        assert_eq!(
            built.envelope.ciphertext().unwrap(),
            CanonicalBytes::new(&draft.personal_data).unwrap().as_bytes()
        );
    }

    #[test]
    fn test_built_envelope_verifies() {
        let signer = SigningKeyPair::generate();
        let enc = PassthroughCredentialEncryption;
        let builder = PackageBuilder::new(&signer, &enc);
        let id = RequestId::from_parts(2026, 3).unwrap();

        let built = builder.build_request_package(&draft(), id, None).unwrap();
        built
            .envelope
            .verify(&signer.public_key())
            .expect("fresh package must verify");
    }

    #[test]
    fn test_envelope_carries_draft_context() {
        let signer = SigningKeyPair::generate();
        let enc = PassthroughCredentialEncryption;
        let builder = PackageBuilder::new(&signer, &enc);
        let draft = draft();
        let id = RequestId::from_parts(2026, 4).unwrap();

        let built = builder.build_request_package(&draft, id, None).unwrap();
        assert_eq!(built.envelope.request_id, id);
        assert_eq!(built.envelope.employer_id, draft.employer_id);
        assert_eq!(built.envelope.metadata.access_level, draft.access_level);
        assert_eq!(built.envelope.metadata.purpose, draft.purpose);
        assert_eq!(built.envelope.metadata.created_by, CREATED_BY);
        assert!(built.envelope.data_encrypted);
        assert_eq!(built.envelope.version, "1.0");
        assert_eq!(built.envelope.format, "DOCScoin Personal Data");
    }

    #[test]
    fn test_pwid_hash_matches_envelope_content_hash() {
        let signer = SigningKeyPair::generate();
        let enc = PassthroughCredentialEncryption;
        let builder = PackageBuilder::new(&signer, &enc);
        let id = RequestId::from_parts(2026, 5).unwrap();

        let built = builder.build_request_package(&draft(), id, None).unwrap();
        assert_eq!(built.pwid_hash, built.envelope.content_hash().unwrap());
    }

    #[test]
    fn test_fresh_key_per_package() {
        let signer = SigningKeyPair::generate();
        let enc = PassthroughCredentialEncryption;
        let builder = PackageBuilder::new(&signer, &enc);
        let id = RequestId::from_parts(2026, 6).unwrap();

        let a = builder.build_request_package(&draft(), id, None).unwrap();
        let b = builder.build_request_package(&draft(), id, None).unwrap();
        let ka = a.symmetric_key.unwrap().to_hex();
        let kb = b.symmetric_key.unwrap().to_hex();
        assert_ne!(ka, kb);
    }
}
