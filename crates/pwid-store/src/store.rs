//! # Request Store — Repository with Injected Backing
//!
//! `RequestStore` owns the canonical copy of every request and the
//! allocation counter for request identifiers. The persisted backing is a
//! [`StoreBackend`]: loaded once at construction, saved on every mutation,
//! never touched directly by callers.
//!
//! ## Invariants
//!
//! - Sequence numbers are strictly increasing and never reused, including
//!   across process restarts — `next_sequence` is part of the snapshot.
//! - `update()` merges; it can never change `id`, `created`, or
//!   `pwid_hash`, and a status change must pass the monotonic guard.
//! - Every mutating call saves the new snapshot before committing it in
//!   memory, so a failed save leaves the store exactly as it was and the
//!   in-memory state never runs ahead of the backing.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pwid_core::{ContentDigest, RequestId, Timestamp};

use crate::request::{Request, RequestDraft, RequestPatch, RequestStatus, TransitionError};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by the request store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No request with the given identifier.
    #[error("request {0} not found")]
    NotFound(RequestId),

    /// A status update violated the lifecycle order.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// An identifier could not be allocated.
    #[error("identifier allocation failed: {0}")]
    Allocation(String),

    /// The persistent backing failed to load or save.
    #[error("store backing error: {0}")]
    Backend(String),
}

// ─── Backend ─────────────────────────────────────────────────────────

/// The persisted shape of the store: allocation counter plus records in
/// insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Next sequence number to allocate.
    pub next_sequence: u64,
    /// Stored requests, oldest first.
    pub records: Vec<Request>,
}

/// Durable key-value backing for the store.
///
/// Implementations must be whole-snapshot: `load` returns everything,
/// `save` replaces everything.
pub trait StoreBackend {
    /// Load the snapshot. An absent backing yields the default snapshot.
    fn load(&self) -> Result<StoreSnapshot, StoreError>;

    /// Durably persist the snapshot.
    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<(), StoreError>;
}

/// In-memory backing for tests. "Durability" is a held snapshot, which is
/// exactly what restart simulations need: open a second store over the
/// same backend and the counter survives.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    snapshot: StoreSnapshot,
}

impl StoreBackend for MemoryBackend {
    fn load(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        self.snapshot = snapshot.clone();
        Ok(())
    }
}

/// JSON file backing. Parent directories are created on first save.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// A file backing at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl StoreBackend for FileBackend {
    fn load(&self) -> Result<StoreSnapshot, StoreError> {
        if !self.path.exists() {
            return Ok(StoreSnapshot::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Backend(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Backend(format!("parse {}: {e}", self.path.display())))
    }

    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Backend(format!("mkdir {}: {e}", parent.display())))?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StoreError::Backend(format!("serialize snapshot: {e}")))?;
        fs::write(&self.path, json)
            .map_err(|e| StoreError::Backend(format!("write {}: {e}", self.path.display())))
    }
}

// ─── Store ───────────────────────────────────────────────────────────

/// The canonical request repository.
pub struct RequestStore<B: StoreBackend> {
    backend: B,
    next_sequence: u64,
    records: Vec<Request>,
    index: HashMap<RequestId, usize>,
}

impl<B: StoreBackend> RequestStore<B> {
    /// Open a store over a backing, loading its persisted snapshot once.
    pub fn open(backend: B) -> Result<Self, StoreError> {
        let snapshot = backend.load()?;
        let next_sequence = snapshot.next_sequence.max(1);
        let records = snapshot.records;
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
        Ok(Self {
            backend,
            next_sequence,
            records,
            index,
        })
    }

    /// The identifier the next `create` call will assign.
    ///
    /// The package builder stamps this into the envelope before the record
    /// exists, so envelope and record always carry the same id.
    pub fn next_request_id(&self) -> Result<RequestId, StoreError> {
        RequestId::from_parts(Timestamp::now().year(), self.next_sequence)
            .map_err(|e| StoreError::Allocation(e.to_string()))
    }

    /// Create a request from an intake draft.
    ///
    /// Allocates the next sequence number, stamps `created`, sets the
    /// status to pending, persists, and returns the stored copy.
    pub fn create(
        &mut self,
        draft: RequestDraft,
        pwid_hash: ContentDigest,
    ) -> Result<Request, StoreError> {
        let created = Timestamp::now();
        let id = RequestId::from_parts(created.year(), self.next_sequence)
            .map_err(|e| StoreError::Allocation(e.to_string()))?;

        let request = Request {
            id,
            employer_id: draft.employer_id,
            auth_type: draft.auth_type,
            purpose: draft.purpose,
            access_level: draft.access_level,
            comment: draft.comment,
            personal_data: draft.personal_data,
            status: RequestStatus::Pending,
            pwid_hash,
            blockchain_tx: None,
            created,
            closed_at: None,
            close_action: None,
            close_data: None,
        };

        // Save first; commit to memory only once the backing accepted it.
        let mut records = self.records.clone();
        records.push(request.clone());
        let snapshot = StoreSnapshot {
            next_sequence: self.next_sequence + 1,
            records,
        };
        self.backend.save(&snapshot)?;

        self.index.insert(request.id, self.records.len());
        self.records = snapshot.records;
        self.next_sequence = snapshot.next_sequence;

        tracing::info!(request_id = %request.id, "request created");
        Ok(request)
    }

    /// Look up a request by identifier.
    pub fn get(&self, id: &RequestId) -> Result<&Request, StoreError> {
        self.index
            .get(id)
            .map(|&i| &self.records[i])
            .ok_or(StoreError::NotFound(*id))
    }

    /// Merge a patch into a stored request and persist.
    ///
    /// Unknown id is reported, not a crash, and leaves the store unchanged.
    /// A status change is validated against the monotonic lifecycle before
    /// anything else is merged.
    pub fn update(&mut self, id: &RequestId, patch: RequestPatch) -> Result<Request, StoreError> {
        let &slot = self.index.get(id).ok_or(StoreError::NotFound(*id))?;

        if let Some(to) = patch.status {
            self.records[slot].status.transition(to)?;
        }

        let mut updated = self.records[slot].clone();
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(tx) = patch.blockchain_tx {
            updated.blockchain_tx = Some(tx);
        }
        if let Some(closed_at) = patch.closed_at {
            updated.closed_at = Some(closed_at);
        }
        if let Some(action) = patch.close_action {
            updated.close_action = Some(action);
        }
        if let Some(close_data) = patch.close_data {
            updated.close_data = Some(close_data);
        }

        // Save first; commit to memory only once the backing accepted it.
        let mut records = self.records.clone();
        records[slot] = updated.clone();
        let snapshot = StoreSnapshot {
            next_sequence: self.next_sequence,
            records,
        };
        self.backend.save(&snapshot)?;
        self.records = snapshot.records;

        tracing::info!(request_id = %updated.id, status = %updated.status, "request updated");
        Ok(updated)
    }

    /// A filtered snapshot in store insertion order.
    pub fn list(&self, predicate: impl Fn(&Request) -> bool) -> Vec<Request> {
        self.records.iter().filter(|r| predicate(r)).cloned().collect()
    }

    /// Requests a closure flow may still act on (pending or submitted).
    pub fn open_requests(&self) -> Vec<Request> {
        self.list(|r| r.status.is_open())
    }

    /// Number of stored requests.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no requests.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the store, returning its backend. Used by restart tests.
    pub fn into_backend(self) -> B {
        self.backend
    }
}
