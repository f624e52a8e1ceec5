//! # Error Types — Structured Error Hierarchy
//!
//! Foundational error types shared across the pwid stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Crate-specific errors (`StoreError`, `PackError`, `FlowError`) live in
//! their own crates and wrap these where appropriate.

use thiserror::Error;

/// Top-level error type for foundational operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An identifier or field failed format validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Amounts and measurements must be strings or integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Symmetric encryption or decryption failed.
    #[error("cipher error: {0}")]
    CipherError(String),

    /// A credential could not be read or was malformed.
    #[error("credential error: {0}")]
    CredentialError(String),
}
