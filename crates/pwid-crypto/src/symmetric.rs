//! # AES-256-GCM Content Encryption
//!
//! The symmetric path used when no recipient credential is available.
//! Ciphertext layout is `nonce || ciphertext` with a random 12-byte nonce,
//! so a single opaque byte string round-trips through the envelope's
//! base64 `data` field.
//!
//! The key is generated per package and returned to the caller alongside
//! the envelope; the engine does not persist it.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use pwid_core::error::CryptoError;

const NONCE_LEN: usize = 12;

/// A 256-bit AES-GCM content-encryption key.
///
/// Does not implement `Serialize`; export is explicit via [`to_hex`].
///
/// [`to_hex`]: SymmetricKey::to_hex
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Reconstruct a key from a 64-character hex export.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        // Byte-index slicing below requires single-byte chars.
        if !hex.is_ascii() {
            return Err(CryptoError::KeyError(
                "symmetric key hex must be ASCII".to_string(),
            ));
        }
        if hex.len() != 64 {
            return Err(CryptoError::KeyError(format!(
                "symmetric key hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
                .map_err(|e| CryptoError::KeyError(format!("invalid hex: {e}")))?;
        }
        Ok(Self(bytes))
    }

    /// Export the key as lowercase hex for out-of-band delivery to the
    /// party that must later decrypt the package.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Encrypt plaintext, returning `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("bad key length: {e}")))?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::CipherError("AES-GCM encryption failed".to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt `nonce || ciphertext` produced by [`encrypt`].
    ///
    /// [`encrypt`]: SymmetricKey::encrypt
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if data.len() < NONCE_LEN {
            return Err(CryptoError::CipherError(
                "ciphertext shorter than nonce".to_string(),
            ));
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("bad key length: {e}")))?;
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::CipherError("AES-GCM decryption failed".to_string()))
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey(<secret>)")
    }
}
