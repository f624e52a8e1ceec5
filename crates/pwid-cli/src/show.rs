//! # Show Subcommand
//!
//! Prints one request's record without its personal data.

use std::path::PathBuf;

use clap::Args;

/// Arguments for the show subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Request identifier, e.g. `REQ-2026-001`.
    pub id: String,

    /// Request store file.
    #[arg(long, default_value = "requests.json")]
    pub store: PathBuf,
}

pub fn run(args: ShowArgs) -> anyhow::Result<()> {
    let store = crate::open_store(&args.store)?;
    let id = crate::parse_request_id(&args.id)?;
    let request = store.get(&id)?;

    println!("id           {}", request.id);
    println!("status       {}", request.status);
    println!("employer     {}", request.employer_id);
    println!("auth type    {}", request.auth_type);
    println!("purpose      {}", request.purpose);
    println!("access level {}", request.access_level);
    if !request.comment.is_empty() {
        println!("comment      {}", request.comment);
    }
    println!("created      {}", request.created.to_iso8601());
    println!("pwid hash    {}", request.pwid_hash);
    if let Some(tx) = &request.blockchain_tx {
        println!("tx           {tx}");
    }
    if let Some(closed_at) = &request.closed_at {
        println!("closed at    {}", closed_at.to_iso8601());
    }
    if let Some(action) = &request.close_action {
        println!("close action {action}");
    }
    Ok(())
}
