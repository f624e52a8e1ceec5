//! # Request Entity and Status Lifecycle
//!
//! Models one employer's access request through its lifecycle:
//!
//! ```text
//! Pending ──▶ Submitted ──▶ Closed   (update path)
//!    │             │
//!    │             └──────▶ Rejected (reject path)
//!    └────────────────────▶ Closed | Rejected
//! ```
//!
//! Transitions are monotonic — there is no path back to an earlier state,
//! and `Closed`/`Rejected` are terminal. The guard lives in
//! [`RequestStatus::transition`] and is enforced by the store on every
//! status-bearing update.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pwid_core::{
    AccessLevel, AuthType, ContentDigest, EmployerId, PersonalData, RequestId, Timestamp,
    TransactionRef,
};

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Created locally, not yet acknowledged by the submission service.
    Pending,
    /// Acknowledged externally; a transaction reference is on record.
    Submitted,
    /// Closed by the verification center with updated data (terminal).
    Closed,
    /// Rejected by the verification center (terminal).
    Rejected,
}

impl RequestStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Rejected)
    }

    /// Whether a closure flow may still act on a request in this state.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted)
    }

    /// Validate a transition to `to`.
    ///
    /// Rejects any move out of a terminal state and any move backward in
    /// the lifecycle order.
    pub fn transition(&self, to: RequestStatus) -> Result<(), TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::AlreadyTerminal { state: *self });
        }
        if to <= *self {
            return Err(TransitionError::NotMonotonic {
                from: *self,
                to,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Rejected status transition.
#[derive(Error, Debug)]
pub enum TransitionError {
    /// The request is already in a terminal state.
    #[error("request is already {state}, no further transitions allowed")]
    AlreadyTerminal {
        /// The terminal state.
        state: RequestStatus,
    },

    /// The attempted transition would move backward.
    #[error("status may only advance: {from} -> {to} is not allowed")]
    NotMonotonic {
        /// Current state.
        from: RequestStatus,
        /// Attempted target state.
        to: RequestStatus,
    },
}

// ─── Close action ────────────────────────────────────────────────────

/// Which closure path terminated the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseAction {
    /// The center supplied an updated package.
    Update,
    /// The center rejected the request.
    Reject,
}

impl CloseAction {
    /// The terminal status this action produces.
    pub fn terminal_status(&self) -> RequestStatus {
        match self {
            Self::Update => RequestStatus::Closed,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

impl std::fmt::Display for CloseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Update => "update",
            Self::Reject => "reject",
        };
        f.write_str(s)
    }
}

// ─── Entity ──────────────────────────────────────────────────────────

/// The stored record of one employer's access request.
///
/// `id`, `created`, and `pwid_hash` are fixed at creation and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Stable identifier, assigned at creation, never reused.
    pub id: RequestId,
    /// The requesting employer.
    pub employer_id: EmployerId,
    /// How the employer authenticated at intake.
    pub auth_type: AuthType,
    /// Declared purpose of the request.
    pub purpose: String,
    /// Scope of personal data granted.
    pub access_level: AccessLevel,
    /// Free-form comment from intake.
    pub comment: String,
    /// The candidate data, gated to `access_level`.
    pub personal_data: PersonalData,
    /// Lifecycle state.
    pub status: RequestStatus,
    /// Content hash of the generated package — the tamper-evidence anchor.
    pub pwid_hash: ContentDigest,
    /// External transaction reference, set on pending → submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain_tx: Option<TransactionRef>,
    /// Creation time, stamped by the store.
    pub created: Timestamp,
    /// Terminal transition time, set exactly once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<Timestamp>,
    /// Which closure path ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_action: Option<CloseAction>,
    /// The closure response payload that ended the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_data: Option<serde_json::Value>,
}

/// Intake draft assembled by the wizard and handed to the package builder
/// and the store. A plain data-transfer object — the engine never reads
/// live presentation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDraft {
    /// The requesting employer.
    pub employer_id: EmployerId,
    /// How the employer authenticated.
    pub auth_type: AuthType,
    /// Declared purpose.
    pub purpose: String,
    /// Requested data scope.
    pub access_level: AccessLevel,
    /// Free-form comment, may be empty.
    #[serde(default)]
    pub comment: String,
    /// Candidate data, already gated to `access_level`.
    pub personal_data: PersonalData,
}

/// Shallow-merge update set for a stored request.
///
/// By construction a patch cannot touch `id`, `created`, or `pwid_hash`.
#[derive(Debug, Clone, Default)]
pub struct RequestPatch {
    /// New lifecycle state, validated against the monotonic order.
    pub status: Option<RequestStatus>,
    /// External transaction reference.
    pub blockchain_tx: Option<TransactionRef>,
    /// Terminal transition time.
    pub closed_at: Option<Timestamp>,
    /// Closure path.
    pub close_action: Option<CloseAction>,
    /// Closure response payload.
    pub close_data: Option<serde_json::Value>,
}

impl RequestPatch {
    /// A patch that only advances the status.
    pub fn status(status: RequestStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// The pending → submitted stamp: status plus transaction reference.
    pub fn submitted(tx: TransactionRef) -> Self {
        Self {
            status: Some(RequestStatus::Submitted),
            blockchain_tx: Some(tx),
            ..Self::default()
        }
    }

    /// The terminal stamp for a closure action.
    pub fn closed(action: CloseAction, close_data: serde_json::Value) -> Self {
        Self {
            status: Some(action.terminal_status()),
            closed_at: Some(Timestamp::now()),
            close_action: Some(action),
            close_data: Some(close_data),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(RequestStatus::Pending
            .transition(RequestStatus::Submitted)
            .is_ok());
        assert!(RequestStatus::Pending
            .transition(RequestStatus::Closed)
            .is_ok());
        assert!(RequestStatus::Pending
            .transition(RequestStatus::Rejected)
            .is_ok());
        assert!(RequestStatus::Submitted
            .transition(RequestStatus::Closed)
            .is_ok());
        assert!(RequestStatus::Submitted
            .transition(RequestStatus::Rejected)
            .is_ok());
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(RequestStatus::Submitted
            .transition(RequestStatus::Pending)
            .is_err());
        assert!(RequestStatus::Submitted
            .transition(RequestStatus::Submitted)
            .is_err());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [RequestStatus::Closed, RequestStatus::Rejected] {
            for target in [
                RequestStatus::Pending,
                RequestStatus::Submitted,
                RequestStatus::Closed,
                RequestStatus::Rejected,
            ] {
                let err = terminal.transition(target).unwrap_err();
                assert!(matches!(err, TransitionError::AlreadyTerminal { .. }));
            }
        }
    }

    #[test]
    fn test_is_open() {
        assert!(RequestStatus::Pending.is_open());
        assert!(RequestStatus::Submitted.is_open());
        assert!(!RequestStatus::Closed.is_open());
        assert!(!RequestStatus::Rejected.is_open());
    }

    #[test]
    fn test_close_action_terminal_status() {
        assert_eq!(CloseAction::Update.terminal_status(), RequestStatus::Closed);
        assert_eq!(
            CloseAction::Reject.terminal_status(),
            RequestStatus::Rejected
        );
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Pending).unwrap(),
            "\"pending\""
        );
        let parsed: RequestStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, RequestStatus::Rejected);
    }
}
