//! # pwid-flow — Workflow Engine
//!
//! The two workflows that drive a request through its lifecycle:
//!
//! - **Intake wizard** (`wizard.rs`): the three-step state machine that
//!   authenticates the employer, collects request details, and submits —
//!   building the package, creating the record, and stamping the external
//!   transaction reference.
//!
//! - **Closure flow** (`closure.rs`): the counter-workflow a verification
//!   center runs to terminate a request with an update or a rejection.
//!
//! - **Services** (`services.rs`): the external submission seam and its
//!   demo ledger stand-in.
//!
//! The engine is a synchronous single actor. Exactly one workflow call runs
//! at a time per process; submission takes `&mut IntakeWizard` and runs to
//! completion, so two submissions can never overlap.

pub mod closure;
pub mod services;
pub mod wizard;

use thiserror::Error;

use pwid_core::RequestId;

pub use closure::{
    close_request, load_pending_requests, select_request, ClosureInstruction, RequestSummary,
};
pub use services::{LedgerStub, SubmissionError, SubmissionKind, SubmissionRecord, SubmissionService};
pub use wizard::{ConfirmationSummary, IntakeWizard, SubmitOutcome, WizardForm, WizardStep};

/// Errors raised by the workflow engine. Every user-facing failure names
/// what was wrong and where.
#[derive(Error, Debug)]
pub enum FlowError {
    /// A step gate rejected the supplied input. The state machine did not
    /// move.
    #[error("validation failed at {step} step, field `{field}`: {message}")]
    Validation {
        /// The step whose gate failed.
        step: WizardStep,
        /// The offending input field.
        field: &'static str,
        /// User-facing detail.
        message: String,
    },

    /// No request with the given identifier.
    #[error("request {0} not found")]
    NotFound(RequestId),

    /// Closure requires a verification center credential.
    #[error("closure requires a verification center credential")]
    MissingCredential,

    /// An update closure requires a freshly supplied package.
    #[error("update closure requires a freshly supplied package")]
    MissingPackage,

    /// The request is already in a terminal state.
    #[error("request {0} is already closed")]
    AlreadyClosed(RequestId),

    /// The external submission collaborator failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Package construction or parsing failed.
    #[error(transparent)]
    Pack(#[from] pwid_pack::PackError),

    /// The request store failed.
    #[error(transparent)]
    Store(#[from] pwid_store::StoreError),
}
