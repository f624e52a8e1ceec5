//! # pwid-store — Durable Request Store
//!
//! The canonical owner of every `Request`. All other components operate on
//! copies or on freshly constructed drafts before handoff; nothing mutates
//! a stored record except through the store's own interface.
//!
//! - **Request** (`request.rs`): the central entity, its monotonic status
//!   lifecycle (`pending → submitted → closed | rejected`), the intake
//!   draft DTO, and the shallow-merge update patch.
//!
//! - **Store** (`store.rs`): `RequestStore` over a pluggable
//!   [`StoreBackend`] — an in-memory map for tests, a JSON file adapter
//!   for production. Every mutating call persists before returning, and
//!   the allocation counter survives reload, so sequence numbers are never
//!   reused across process restarts.

pub mod request;
pub mod store;

pub use request::{
    CloseAction, Request, RequestDraft, RequestPatch, RequestStatus, TransitionError,
};
pub use store::{FileBackend, MemoryBackend, RequestStore, StoreBackend, StoreError, StoreSnapshot};
