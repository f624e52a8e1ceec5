//! # Submission Seam
//!
//! The external collaborator that records a package or closure response on
//! the ledger. The engine only depends on the [`SubmissionService`] trait;
//! [`LedgerStub`] is the demo stand-in, producing references in the same
//! `0x` + 64-hex format a real ledger would return.

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use pwid_core::{RequestId, TransactionRef};

/// What is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    /// A freshly built request package.
    Package,
    /// An encrypted closure response.
    Closure,
}

/// One submission to the external ledger.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    /// The request the submission belongs to.
    pub request_id: RequestId,
    /// Package or closure response.
    pub kind: SubmissionKind,
    /// The serialized payload: envelope JSON for packages, base64
    /// ciphertext for closure responses.
    pub payload: String,
}

/// Submission failure. The caller decides whether the surrounding state
/// change is rolled back or left pending for retry.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The ledger refused or could not record the submission.
    #[error("submission failed: {0}")]
    Failed(String),
}

/// Records a submission externally, returning an opaque transaction
/// reference.
pub trait SubmissionService {
    /// Submit a record, returning the ledger's reference for it.
    fn submit(&self, record: &SubmissionRecord) -> Result<TransactionRef, SubmissionError>;
}

/// Demo ledger: accepts everything and mints a random reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerStub;

impl SubmissionService for LedgerStub {
    fn submit(&self, record: &SubmissionRecord) -> Result<TransactionRef, SubmissionError> {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let reference = TransactionRef(format!("0x{hex}"));
        tracing::info!(request_id = %record.request_id, tx = %reference.0, "submission recorded");
        Ok(reference)
    }
}
