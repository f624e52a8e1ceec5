//! # Ed25519 Package Signing
//!
//! Signatures over package ciphertext. An envelope is only considered valid
//! once its signature verifies against the ciphertext it carries.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&CanonicalBytes` — you cannot sign raw bytes,
//!   so all signed data has passed through the canonicalization pipeline.
//! - Private keys are never serialized or logged. `SigningKeyPair` does not
//!   implement `Serialize` and its `Debug` output is redacted.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as hex-encoded strings.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use pwid_core::error::CryptoError;
use pwid_core::CanonicalBytes;

/// An Ed25519 public key (32 bytes) for package signature verification.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SigningPublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes) over package ciphertext.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PackageSignature(pub [u8; 64]);

/// An Ed25519 key pair used to sign packages and closure responses.
pub struct SigningKeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ─── SigningPublicKey ────────────────────────────────────────────────

impl SigningPublicKey {
    /// The raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_decode(hex, 32).map_err(CryptoError::KeyError)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for SigningPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SigningPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for SigningPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningPublicKey({}...)", hex_encode(&self.0[..4]))
    }
}

impl std::fmt::Display for SigningPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ─── PackageSignature ────────────────────────────────────────────────

impl PackageSignature {
    /// The raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }

    /// Parse from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_decode(hex, 64).map_err(CryptoError::VerificationFailed)?;
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for PackageSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PackageSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for PackageSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PackageSignature({}...)", hex_encode(&self.0[..4]))
    }
}

// ─── SigningKeyPair ──────────────────────────────────────────────────

impl SigningKeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Deterministic key pair from a 32-byte seed. Test and tooling use.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> SigningPublicKey {
        SigningPublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    ///
    /// The input type enforces that only canonicalized data can be signed.
    pub fn sign(&self, data: &CanonicalBytes) -> PackageSignature {
        PackageSignature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKeyPair(<private>)")
    }
}

// ─── Verification ────────────────────────────────────────────────────

/// Verify a package signature over canonical bytes.
///
/// Returns `Ok(())` if valid, `CryptoError::VerificationFailed` otherwise.
pub fn verify_signature(
    data: &CanonicalBytes,
    signature: &PackageSignature,
    public_key: &SigningPublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("ed25519 verification failed: {e}")))
}

// ─── Hex utilities ───────────────────────────────────────────────────

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(hex: &str, expected_len: usize) -> Result<Vec<u8>, String> {
    let hex = hex.trim().to_lowercase();
    // Byte-index slicing below requires single-byte chars.
    if !hex.is_ascii() {
        return Err("hex must be ASCII".to_string());
    }
    if hex.len() != expected_len * 2 {
        return Err(format!(
            "hex must be {} chars, got {}",
            expected_len * 2,
            hex.len()
        ));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}
