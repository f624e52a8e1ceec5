//! # pwid-crypto — Crypto Provider and Certificate Reader
//!
//! The cryptographic seams of the pwid stack:
//!
//! - **Signing** (`signing.rs`): Ed25519 key pairs, package signatures, and
//!   verification over canonical bytes.
//!
//! - **Symmetric** (`symmetric.rs`): AES-256-GCM content encryption for the
//!   credentials (non-certificate) path, nonce prepended to the ciphertext.
//!
//! - **Credential** (`credential.rs`): PEM-shaped credential reading with
//!   subject-field extraction, and the recipient-encryption seam used to
//!   encrypt packages and closure responses for a credential holder.
//!
//! ## Security Invariant
//!
//! Signing input must be `&CanonicalBytes` — raw bytes cannot be signed.
//! Private keys are never serialized; `Debug` output is redacted.

pub mod credential;
pub mod signing;
pub mod symmetric;

pub use credential::{
    Credential, CredentialEncryption, CredentialInfo, PassthroughCredentialEncryption,
};
pub use signing::{verify_signature, PackageSignature, SigningKeyPair, SigningPublicKey};
pub use symmetric::SymmetricKey;
