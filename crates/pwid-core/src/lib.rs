//! # pwid-core — Foundational Types for the pwid Stack
//!
//! The bedrock crate of the personal-data request stack. Every other crate
//! in the workspace depends on `pwid-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `RequestId`, `EmployerId`,
//!    `TransactionRef` — validated constructors, no bare strings for
//!    identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** All digest and signing input flows
//!    through `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for
//!    hashes, ever. A package hash computed over non-canonical bytes would
//!    break tamper evidence across process restarts.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision, matching the canonicalization rules.
//!
//! 4. **Tiered personal data.** `PersonalData` encodes the basic/extended/
//!    full superset invariant structurally: the basic tier is not optional.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pwid-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod personal;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, CoreError, CryptoError};
pub use identity::{AccessLevel, AuthType, EmployerId, RequestId, TransactionRef};
pub use personal::{BasicProfile, ExtendedProfile, FullProfile, PersonalData};
pub use temporal::Timestamp;
