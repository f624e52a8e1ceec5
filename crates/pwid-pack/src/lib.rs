//! # pwid-pack — Package Engine
//!
//! Builds and verifies the encrypted personal-data package ("pwid") and the
//! closure response packages that end a request's lifecycle:
//!
//! - **Envelope** (`envelope.rs`): the `.pwid` wire structure, its canonical
//!   content hash, and signature verification.
//!
//! - **Builder** (`builder.rs`): `PackageBuilder` — serializes a request
//!   draft, encrypts it for a recipient credential or under a fresh
//!   symmetric key, signs the ciphertext, and computes `pwid_hash`.
//!
//! - **Response** (`response.rs`): update and rejection response packages
//!   for the closure flow, encrypted for the verification center.
//!
//! ## Security Invariant
//!
//! An envelope is not considered valid until its signature verifies against
//! the ciphertext it carries. `data_encrypted` is a declared claim; the
//! engine does not independently confirm it — that is the external
//! verification collaborator's job.

pub mod builder;
pub mod envelope;
pub mod response;

use thiserror::Error;

pub use builder::{BuiltPackage, PackageBuilder};
pub use envelope::{EncryptionMethod, EnvelopeMetadata, PwidEnvelope};
pub use response::{
    build_rejection_response, build_update_response, encrypt_for_center, ClosureResponse,
    PackagePreview,
};

/// Errors raised by the package engine.
#[derive(Error, Debug)]
pub enum PackError {
    /// Canonical serialization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] pwid_core::CanonicalizationError),

    /// A cryptographic operation failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] pwid_core::CryptoError),

    /// An envelope could not be parsed or serialized.
    #[error("envelope error: {0}")]
    Envelope(String),

    /// The ciphertext field is not valid base64.
    #[error("ciphertext encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),
}
