//! # Intake Wizard — Three-Step State Machine
//!
//! ```text
//! Auth ──advance──▶ Details ──advance──▶ Confirm ──submit──▶ (reset to Auth)
//!   ◀────back─────          ◀────back────
//! ```
//!
//! Each forward transition validates the current step's slice of the
//! [`WizardForm`]; on failure the machine does not move and the error names
//! the step and field. `advance` at Confirm is a no-op — submission is the
//! only way forward from there. On successful submission the wizard resets
//! to Auth with cleared state; on failure it stays at Confirm with the
//! collected draft intact so the operator can retry.

use pwid_core::{AccessLevel, AuthType, EmployerId, PersonalData, TransactionRef};
use pwid_crypto::{Credential, CredentialEncryption, SigningKeyPair, SymmetricKey};
use pwid_pack::{PackageBuilder, PwidEnvelope};
use pwid_store::{Request, RequestDraft, RequestPatch, RequestStore, StoreBackend};

use crate::services::{SubmissionKind, SubmissionRecord, SubmissionService};
use crate::FlowError;

/// The wizard's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    /// Step 1: authenticate the employer.
    Auth,
    /// Step 2: collect purpose, access level, and comment.
    Details,
    /// Step 3: review and affirm the data-sharing agreement.
    Confirm,
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Auth => "auth",
            Self::Details => "details",
            Self::Confirm => "confirm",
        };
        f.write_str(s)
    }
}

/// The operator's input, assembled once per operation and passed in whole.
/// Each step validates only its own fields.
#[derive(Debug, Clone, Default)]
pub struct WizardForm {
    /// PEM credential text, if a credential file was supplied.
    pub credential_pem: Option<String>,
    /// Login for the credentials path.
    pub login: String,
    /// Password for the credentials path.
    pub password: String,
    /// Employer identifier for the credentials path.
    pub employer_id: String,
    /// Declared purpose of the request.
    pub purpose: String,
    /// Requested data scope; absent means basic.
    pub access_level: Option<AccessLevel>,
    /// Free-form comment, optional.
    pub comment: String,
    /// Whether the data-sharing agreement was affirmed.
    pub agreement_affirmed: bool,
}

/// What the Auth gate produced.
#[derive(Debug, Clone)]
struct AuthOutcome {
    auth_type: AuthType,
    employer_id: EmployerId,
    credential: Option<Credential>,
}

/// What the Details gate produced.
#[derive(Debug, Clone)]
struct DetailsOutcome {
    purpose: String,
    access_level: AccessLevel,
    comment: String,
}

/// The review view shown at Confirm. Never includes personal data.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationSummary {
    /// How the employer authenticated.
    pub auth_type: AuthType,
    /// The requesting employer.
    pub employer_id: EmployerId,
    /// Declared purpose.
    pub purpose: String,
    /// Requested data scope.
    pub access_level: AccessLevel,
}

/// The result of a successful submission.
#[derive(Debug)]
pub struct SubmitOutcome {
    /// The stored record, already advanced to submitted.
    pub request: Request,
    /// The built envelope, ready to be written to a `.pwid` file.
    pub envelope: PwidEnvelope,
    /// The content-encryption key on the symmetric path.
    pub symmetric_key: Option<SymmetricKey>,
    /// The ledger's reference for the submission.
    pub transaction: TransactionRef,
}

/// The intake state machine.
///
/// Holds the candidate's full personal data from construction; submission
/// gates it down to the granted access level before it leaves the wizard.
#[derive(Debug)]
pub struct IntakeWizard {
    step: WizardStep,
    candidate: PersonalData,
    auth: Option<AuthOutcome>,
    details: Option<DetailsOutcome>,
}

impl IntakeWizard {
    /// A fresh wizard at Auth over the candidate's data.
    pub fn new(candidate: PersonalData) -> Self {
        Self {
            step: WizardStep::Auth,
            candidate,
            auth: None,
            details: None,
        }
    }

    /// Current step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Validate the current step against the form and move forward.
    ///
    /// At Confirm this is a no-op — [`submit`] is the only exit. On a gate
    /// failure the step does not change.
    ///
    /// [`submit`]: IntakeWizard::submit
    pub fn advance(&mut self, form: &WizardForm) -> Result<WizardStep, FlowError> {
        match self.step {
            WizardStep::Auth => {
                self.auth = Some(validate_auth(form)?);
                self.step = WizardStep::Details;
            }
            WizardStep::Details => {
                self.details = Some(validate_details(form)?);
                self.step = WizardStep::Confirm;
            }
            WizardStep::Confirm => {}
        }
        tracing::debug!(step = %self.step, "wizard advanced");
        Ok(self.step)
    }

    /// Move back one step. A no-op at Auth. Collected outcomes are kept;
    /// advancing again revalidates and overwrites them.
    pub fn back(&mut self) -> WizardStep {
        self.step = match self.step {
            WizardStep::Auth => WizardStep::Auth,
            WizardStep::Details => WizardStep::Auth,
            WizardStep::Confirm => WizardStep::Details,
        };
        self.step
    }

    /// The review view. Only available at Confirm.
    pub fn confirmation_summary(&self) -> Result<ConfirmationSummary, FlowError> {
        if self.step != WizardStep::Confirm {
            return Err(FlowError::Validation {
                step: self.step,
                field: "step",
                message: "summary is only available at confirmation".to_string(),
            });
        }
        // Both outcomes exist at Confirm by construction.
        match (&self.auth, &self.details) {
            (Some(auth), Some(details)) => Ok(ConfirmationSummary {
                auth_type: auth.auth_type,
                employer_id: auth.employer_id.clone(),
                purpose: details.purpose.clone(),
                access_level: details.access_level,
            }),
            _ => Err(FlowError::Validation {
                step: self.step,
                field: "step",
                message: "wizard state is incomplete".to_string(),
            }),
        }
    }

    /// Submit the collected draft: build the package, create the record,
    /// submit externally, and stamp the transaction reference.
    ///
    /// Only reachable from Confirm with an affirmed agreement; rejected
    /// without side effects otherwise. Duplicate activation cannot overlap
    /// a submission in flight: the call takes `&mut self` and runs to
    /// completion with no suspension point, and success resets the step to
    /// Auth so a repeat activation is rejected by the step gate. If the
    /// external submission fails the created record stays pending and the
    /// wizard stays at Confirm — retrying mints a new package and hash.
    pub fn submit<B: StoreBackend>(
        &mut self,
        form: &WizardForm,
        store: &mut RequestStore<B>,
        signer: &SigningKeyPair,
        encryption: &dyn CredentialEncryption,
        submission: &dyn SubmissionService,
    ) -> Result<SubmitOutcome, FlowError> {
        if self.step != WizardStep::Confirm {
            return Err(FlowError::Validation {
                step: self.step,
                field: "step",
                message: "submit is only available at confirmation".to_string(),
            });
        }
        if !form.agreement_affirmed {
            return Err(FlowError::Validation {
                step: self.step,
                field: "agreement",
                message: "the data-sharing agreement must be affirmed".to_string(),
            });
        }
        let (auth, details) = match (&self.auth, &self.details) {
            (Some(auth), Some(details)) => (auth.clone(), details.clone()),
            _ => {
                return Err(FlowError::Validation {
                    step: self.step,
                    field: "step",
                    message: "wizard state is incomplete".to_string(),
                })
            }
        };

        let result = self.run_submission(auth, details, store, signer, encryption, submission);
        if result.is_ok() {
            self.step = WizardStep::Auth;
            self.auth = None;
            self.details = None;
        }
        result
    }

    fn run_submission<B: StoreBackend>(
        &self,
        auth: AuthOutcome,
        details: DetailsOutcome,
        store: &mut RequestStore<B>,
        signer: &SigningKeyPair,
        encryption: &dyn CredentialEncryption,
        submission: &dyn SubmissionService,
    ) -> Result<SubmitOutcome, FlowError> {
        let draft = RequestDraft {
            employer_id: auth.employer_id,
            auth_type: auth.auth_type,
            purpose: details.purpose,
            access_level: details.access_level,
            comment: details.comment,
            personal_data: self.candidate.redacted_to(details.access_level),
        };

        // Stamp the envelope with the id the store is about to assign.
        let request_id = store.next_request_id()?;
        let builder = PackageBuilder::new(signer, encryption);
        let built = builder.build_request_package(&draft, request_id, auth.credential.as_ref())?;

        let request = store.create(draft, built.pwid_hash)?;
        let record = SubmissionRecord {
            request_id: request.id,
            kind: SubmissionKind::Package,
            payload: built.envelope.to_json()?,
        };
        let transaction = submission.submit(&record)?;
        let request = store.update(&request.id, RequestPatch::submitted(transaction.clone()))?;

        tracing::info!(request_id = %request.id, tx = %transaction, "request submitted");
        Ok(SubmitOutcome {
            request,
            envelope: built.envelope,
            symmetric_key: built.symmetric_key,
            transaction,
        })
    }
}

fn validation(step: WizardStep, field: &'static str, message: impl Into<String>) -> FlowError {
    FlowError::Validation {
        step,
        field,
        message: message.into(),
    }
}

/// The Auth gate: a credential file selects the certificate path and
/// derives the employer identity from its subject; otherwise login,
/// password, and employer id must all be present.
fn validate_auth(form: &WizardForm) -> Result<AuthOutcome, FlowError> {
    if let Some(pem) = &form.credential_pem {
        let credential = Credential::parse_pem(pem)
            .map_err(|e| validation(WizardStep::Auth, "credential", e.to_string()))?;
        let employer_id = EmployerId::new(credential.derived_identity())
            .map_err(|e| validation(WizardStep::Auth, "credential", e.to_string()))?;
        return Ok(AuthOutcome {
            auth_type: AuthType::Certificate,
            employer_id,
            credential: Some(credential),
        });
    }

    if form.login.trim().is_empty() {
        return Err(validation(WizardStep::Auth, "login", "login is required"));
    }
    if form.password.trim().is_empty() {
        return Err(validation(
            WizardStep::Auth,
            "password",
            "password is required",
        ));
    }
    let employer_id = EmployerId::new(form.employer_id.trim())
        .map_err(|_| validation(WizardStep::Auth, "employer_id", "employer id is required"))?;
    Ok(AuthOutcome {
        auth_type: AuthType::Credentials,
        employer_id,
        credential: None,
    })
}

/// The Details gate: purpose is required; access level defaults to basic;
/// a missing comment degrades to empty.
fn validate_details(form: &WizardForm) -> Result<DetailsOutcome, FlowError> {
    let purpose = form.purpose.trim();
    if purpose.is_empty() {
        return Err(validation(
            WizardStep::Details,
            "purpose",
            "purpose is required",
        ));
    }
    Ok(DetailsOutcome {
        purpose: purpose.to_string(),
        access_level: form.access_level.unwrap_or_default(),
        comment: form.comment.trim().to_string(),
    })
}
