//! # pwid-cli — Command-Line Interface for the pwid Stack
//!
//! ## Subcommands
//!
//! - `create` — run the intake wizard over a draft file, build and submit
//!   the package, write the `.pwid` file
//! - `list` — list stored requests
//! - `show` — one request's summary, without personal data
//! - `close` — run the closure flow (update or reject)
//! - `verify` — check a `.pwid` file's signature and declared fields
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the domain crates — no business logic
//!   here beyond file I/O and output formatting.

pub mod close;
pub mod create;
pub mod list;
pub mod show;
pub mod verify;

use std::path::Path;

use anyhow::Context;

use pwid_core::RequestId;
use pwid_store::{FileBackend, RequestStore};

/// Open the request store at the given path.
pub(crate) fn open_store(path: &Path) -> anyhow::Result<RequestStore<FileBackend>> {
    RequestStore::open(FileBackend::new(path))
        .with_context(|| format!("opening store at {}", path.display()))
}

/// Parse a `REQ-<year>-<seq>` identifier argument.
pub(crate) fn parse_request_id(s: &str) -> anyhow::Result<RequestId> {
    RequestId::parse(s).with_context(|| format!("invalid request id `{s}`"))
}
