//! # Close Subcommand
//!
//! Runs the closure flow against the store: update with a freshly supplied
//! package, or reject with a reason.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};

use pwid_crypto::{Credential, PassthroughCredentialEncryption};
use pwid_flow::{close_request, ClosureInstruction, LedgerStub};

/// Which closure path to run.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CloseActionArg {
    /// Close with an updated package.
    Update,
    /// Reject the request.
    Reject,
}

/// Arguments for the close subcommand.
#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Request identifier, e.g. `REQ-2026-001`.
    pub id: String,

    /// Closure path.
    #[arg(long, value_enum)]
    pub action: CloseActionArg,

    /// The verification center's PEM credential file.
    #[arg(long)]
    pub credential: PathBuf,

    /// The replacement `.pwid` file (update only).
    #[arg(long)]
    pub package: Option<PathBuf>,

    /// Operator comment (update only).
    #[arg(long, default_value = "")]
    pub comment: String,

    /// Reason code (reject only).
    #[arg(long, default_value = "")]
    pub reason: String,

    /// Free-text detail (reject only).
    #[arg(long, default_value = "")]
    pub details: String,

    /// Request store file.
    #[arg(long, default_value = "requests.json")]
    pub store: PathBuf,
}

pub fn run(args: CloseArgs) -> anyhow::Result<()> {
    let mut store = crate::open_store(&args.store)?;
    let id = crate::parse_request_id(&args.id)?;

    let pem = fs::read_to_string(&args.credential)
        .with_context(|| format!("reading credential {}", args.credential.display()))?;
    let credential = Credential::parse_pem(&pem).context("parsing center credential")?;

    let instruction = match args.action {
        CloseActionArg::Update => {
            let new_package_json = match &args.package {
                Some(path) => Some(
                    fs::read_to_string(path)
                        .with_context(|| format!("reading package {}", path.display()))?,
                ),
                None => None,
            };
            ClosureInstruction::Update {
                new_package_json,
                comment: args.comment,
            }
        }
        CloseActionArg::Reject => {
            anyhow::ensure!(!args.reason.is_empty(), "--reason is required for reject");
            ClosureInstruction::Reject {
                reason: args.reason,
                details: args.details,
            }
        }
    };

    let closed = close_request(
        &mut store,
        &LedgerStub,
        &PassthroughCredentialEncryption,
        &id,
        Some(&credential),
        instruction,
    )?;

    println!("closed    {}", closed.id);
    println!("status    {}", closed.status);
    if let Some(closed_at) = &closed.closed_at {
        println!("closed at {}", closed_at.to_iso8601());
    }
    Ok(())
}
