//! # Closure Flow — Terminating a Request
//!
//! The counter-workflow a verification center operator runs: list the
//! requests still open, inspect a summary (never raw personal data), then
//! close one with an update or a rejection. Closing builds the response
//! package, encrypts it for the center's credential, submits it, and makes
//! one atomic terminal update to the stored record.

use pwid_core::{RequestId, Timestamp};
use pwid_crypto::{Credential, CredentialEncryption};
use pwid_pack::{build_rejection_response, build_update_response, encrypt_for_center, PackError};
use pwid_store::{
    CloseAction, Request, RequestPatch, RequestStatus, RequestStore, StoreBackend, StoreError,
};

use crate::services::{SubmissionKind, SubmissionRecord, SubmissionService};
use crate::FlowError;

/// The display view of a request offered for selection. Exposes context
/// only — personal data never reaches the closure operator.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSummary {
    /// Request identifier.
    pub id: RequestId,
    /// Creation time.
    pub created: Timestamp,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Declared purpose.
    pub purpose: String,
}

impl RequestSummary {
    fn from_request(request: &Request) -> Self {
        Self {
            id: request.id,
            created: request.created,
            status: request.status,
            purpose: request.purpose.clone(),
        }
    }
}

impl std::fmt::Display for RequestSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.id,
            self.purpose,
            self.created.to_iso8601()
        )
    }
}

/// Which closure path to run, with its payload.
#[derive(Debug, Clone)]
pub enum ClosureInstruction {
    /// Close with a freshly supplied replacement package.
    Update {
        /// JSON of the new package. Absence fails with `MissingPackage`.
        new_package_json: Option<String>,
        /// Operator comment.
        comment: String,
    },
    /// Reject the request.
    Reject {
        /// Machine-readable reason code.
        reason: String,
        /// Free-text detail for the employer.
        details: String,
    },
}

impl ClosureInstruction {
    fn action(&self) -> CloseAction {
        match self {
            Self::Update { .. } => CloseAction::Update,
            Self::Reject { .. } => CloseAction::Reject,
        }
    }
}

/// Requests a closure flow may still act on, in store insertion order.
pub fn load_pending_requests<B: StoreBackend>(store: &RequestStore<B>) -> Vec<RequestSummary> {
    store
        .open_requests()
        .iter()
        .map(RequestSummary::from_request)
        .collect()
}

/// Look up one request's summary for display before acting on it.
pub fn select_request<B: StoreBackend>(
    store: &RequestStore<B>,
    id: &RequestId,
) -> Result<RequestSummary, FlowError> {
    match store.get(id) {
        Ok(request) => Ok(RequestSummary::from_request(request)),
        Err(StoreError::NotFound(id)) => Err(FlowError::NotFound(id)),
        Err(e) => Err(FlowError::Store(e)),
    }
}

/// Terminate a request with an update or a rejection.
///
/// Builds the closure response, encrypts it for the center's credential,
/// submits it, then applies one terminal update: status, `closed_at`,
/// `close_action`, `close_data`. Retrying on an already-terminal request
/// fails with `AlreadyClosed` and leaves `close_data` untouched.
pub fn close_request<B: StoreBackend>(
    store: &mut RequestStore<B>,
    submission: &dyn SubmissionService,
    encryption: &dyn CredentialEncryption,
    id: &RequestId,
    center_credential: Option<&Credential>,
    instruction: ClosureInstruction,
) -> Result<Request, FlowError> {
    let request = match store.get(id) {
        Ok(request) => request.clone(),
        Err(StoreError::NotFound(id)) => return Err(FlowError::NotFound(id)),
        Err(e) => return Err(FlowError::Store(e)),
    };
    if request.status.is_terminal() {
        return Err(FlowError::AlreadyClosed(request.id));
    }
    let credential = center_credential.ok_or(FlowError::MissingCredential)?;

    let response = match &instruction {
        ClosureInstruction::Update {
            new_package_json,
            comment,
        } => {
            let json = new_package_json.as_deref().ok_or(FlowError::MissingPackage)?;
            build_update_response(&request, json, comment.clone())?
        }
        ClosureInstruction::Reject { reason, details } => {
            build_rejection_response(&request, reason.clone(), details.clone())
        }
    };

    let ciphertext = encrypt_for_center(&response, credential, encryption)?;
    submission.submit(&SubmissionRecord {
        request_id: request.id,
        kind: SubmissionKind::Closure,
        payload: ciphertext,
    })?;

    let close_data = serde_json::to_value(&response)
        .map_err(|e| FlowError::Pack(PackError::Envelope(e.to_string())))?;
    let closed = store.update(&request.id, RequestPatch::closed(instruction.action(), close_data))?;

    tracing::info!(request_id = %closed.id, action = %instruction.action(), "request closed");
    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use pwid_core::{
        AccessLevel, AuthType, BasicProfile, EmployerId, PersonalData, TransactionRef,
    };
    use pwid_crypto::{PassthroughCredentialEncryption, SigningKeyPair};
    use pwid_pack::PackageBuilder;
    use pwid_store::{MemoryBackend, RequestDraft};

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

    fn center_credential() -> Credential {
        let body = BASE64.encode(b"not-a-real-der-certificate");
        let pem = format!(
            "Subject: CN=Verification Center\n\
             -----BEGIN CERTIFICATE-----\n{body}\n-----END CERTIFICATE-----\n"
        );
        Credential::parse_pem(&pem).unwrap()
    }

    /// A store with one submitted request, returning the request and the
    /// JSON of a package suitable as an update replacement.
    fn seeded_store() -> (RequestStore<MemoryBackend>, Request, String) {
        let mut store = RequestStore::open(MemoryBackend::default()).unwrap();
        let signer = SigningKeyPair::generate();
        let enc = PassthroughCredentialEncryption;
        let draft = draft();

        let id = store.next_request_id().unwrap();
        let built = PackageBuilder::new(&signer, &enc)
            .build_request_package(&draft, id, None)
            .unwrap();
        store.create(draft.clone(), built.pwid_hash).unwrap();
        let request = store
            .update(&id, RequestPatch::submitted(TransactionRef("0x1".into())))
            .unwrap();

        let replacement = PackageBuilder::new(&signer, &enc)
            .build_request_package(&draft, id, None)
            .unwrap();
        (store, request, replacement.envelope.to_json().unwrap())
    }

    #[test]
    fn test_load_pending_filters_open_states() {
        let (mut store, request, _) = seeded_store();
        assert_eq!(load_pending_requests(&store).len(), 1);

        store
            .update(
                &request.id,
                RequestPatch::closed(CloseAction::Reject, serde_json::json!({})),
            )
            .unwrap();
        assert!(load_pending_requests(&store).is_empty());
    }

    #[test]
    fn test_select_request_summary_has_no_personal_data() {
        let (store, request, _) = seeded_store();
        let summary = select_request(&store, &request.id).unwrap();
        assert_eq!(summary.id, request.id);
        assert_eq!(summary.status, RequestStatus::Submitted);
        assert_eq!(summary.purpose, "background_check");
        assert_eq!(
            summary.to_string(),
            format!(
                "{} - background_check ({})",
                request.id,
                request.created.to_iso8601()
            )
        );
    }

    #[test]
    fn test_select_unknown_request() {
        let (store, _, _) = seeded_store();
        let ghost = RequestId::from_parts(2030, 42).unwrap();
        assert!(matches!(
            select_request(&store, &ghost),
            Err(FlowError::NotFound(_))
        ));
    }

    #[test]
    fn test_close_unknown_request() {
        let (mut store, _, _) = seeded_store();
        let ghost = RequestId::from_parts(2030, 42).unwrap();
        let result = close_request(
            &mut store,
            &crate::services::LedgerStub,
            &PassthroughCredentialEncryption,
            &ghost,
            Some(&center_credential()),
            ClosureInstruction::Reject {
                reason: "data_mismatch".to_string(),
                details: String::new(),
            },
        );
        assert!(matches!(result, Err(FlowError::NotFound(_))));
    }

    #[test]
    fn test_close_requires_credential() {
        let (mut store, request, _) = seeded_store();
        let result = close_request(
            &mut store,
            &crate::services::LedgerStub,
            &PassthroughCredentialEncryption,
            &request.id,
            None,
            ClosureInstruction::Reject {
                reason: "data_mismatch".to_string(),
                details: String::new(),
            },
        );
        assert!(matches!(result, Err(FlowError::MissingCredential)));
        assert_eq!(
            store.get(&request.id).unwrap().status,
            RequestStatus::Submitted
        );
    }

    #[test]
    fn test_update_requires_fresh_package() {
        let (mut store, request, _) = seeded_store();
        let result = close_request(
            &mut store,
            &crate::services::LedgerStub,
            &PassthroughCredentialEncryption,
            &request.id,
            Some(&center_credential()),
            ClosureInstruction::Update {
                new_package_json: None,
                comment: String::new(),
            },
        );
        assert!(matches!(result, Err(FlowError::MissingPackage)));
    }

    #[test]
    fn test_update_closure_terminal_state() {
        let (mut store, request, replacement_json) = seeded_store();
        let closed = close_request(
            &mut store,
            &crate::services::LedgerStub,
            &PassthroughCredentialEncryption,
            &request.id,
            Some(&center_credential()),
            ClosureInstruction::Update {
                new_package_json: Some(replacement_json),
                comment: "refreshed".to_string(),
            },
        )
        .unwrap();

        assert_eq!(closed.status, RequestStatus::Closed);
        assert_eq!(closed.close_action, Some(CloseAction::Update));
        assert!(closed.closed_at.is_some());
        let close_data = closed.close_data.expect("close_data recorded");
        assert_eq!(close_data["type"], "update");
        assert_eq!(
            close_data["original_pwid_hash"],
            request.pwid_hash.to_hex()
        );
    }

    #[test]
    fn test_reject_closure_then_retry_already_closed() {
        let (mut store, request, _) = seeded_store();
        let reject = || ClosureInstruction::Reject {
            reason: "data_mismatch".to_string(),
            details: "passport expired".to_string(),
        };

        let closed = close_request(
            &mut store,
            &crate::services::LedgerStub,
            &PassthroughCredentialEncryption,
            &request.id,
            Some(&center_credential()),
            reject(),
        )
        .unwrap();
        assert_eq!(closed.status, RequestStatus::Rejected);
        assert_eq!(closed.close_action, Some(CloseAction::Reject));
        assert!(closed.closed_at.is_some());

        let retry = close_request(
            &mut store,
            &crate::services::LedgerStub,
            &PassthroughCredentialEncryption,
            &request.id,
            Some(&center_credential()),
            reject(),
        );
        assert!(matches!(retry, Err(FlowError::AlreadyClosed(_))));
        // close_data untouched by the failed retry.
        let stored = store.get(&request.id).unwrap();
        assert_eq!(
            stored.close_data.as_ref().unwrap()["reason"],
            "data_mismatch"
        );
    }
}
