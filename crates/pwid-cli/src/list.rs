//! # List Subcommand

use std::path::PathBuf;

use clap::Args;

use pwid_store::RequestStatus;

/// Arguments for the list subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Request store file.
    #[arg(long, default_value = "requests.json")]
    pub store: PathBuf,

    /// Only show requests a closure flow may still act on.
    #[arg(long)]
    pub open: bool,

    /// Only show requests with this status.
    #[arg(long)]
    pub status: Option<String>,
}

pub fn run(args: ListArgs) -> anyhow::Result<()> {
    let store = crate::open_store(&args.store)?;
    let status_filter = args
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?;

    let requests = store.list(|r| {
        (!args.open || r.status.is_open())
            && status_filter.map_or(true, |wanted| r.status == wanted)
    });
    if requests.is_empty() {
        println!("no requests");
        return Ok(());
    }
    for request in requests {
        println!(
            "{} - {} ({}) [{}]",
            request.id,
            request.purpose,
            request.created.to_iso8601(),
            request.status
        );
    }
    Ok(())
}

fn parse_status(s: &str) -> anyhow::Result<RequestStatus> {
    match s {
        "pending" => Ok(RequestStatus::Pending),
        "submitted" => Ok(RequestStatus::Submitted),
        "closed" => Ok(RequestStatus::Closed),
        "rejected" => Ok(RequestStatus::Rejected),
        other => anyhow::bail!("unknown status `{other}`"),
    }
}
