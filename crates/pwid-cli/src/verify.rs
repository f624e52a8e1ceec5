//! # Verify Subcommand
//!
//! Parses a `.pwid` file and checks its signature and declared fields.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use pwid_crypto::SigningPublicKey;
use pwid_pack::PwidEnvelope;

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// The `.pwid` file to verify.
    pub file: PathBuf,

    /// The signer's public key as 64 hex chars.
    #[arg(long)]
    pub public_key: String,
}

pub fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let json = fs::read_to_string(&args.file)
        .with_context(|| format!("reading package {}", args.file.display()))?;
    let envelope = PwidEnvelope::from_json(&json)?;
    let public_key =
        SigningPublicKey::from_hex(&args.public_key).context("parsing public key")?;

    envelope.verify(&public_key).context("signature check failed")?;

    println!("signature    OK");
    println!("request      {}", envelope.request_id);
    println!("employer     {}", envelope.employer_id);
    println!("format       {} v{}", envelope.format, envelope.version);
    println!("encryption   {}", envelope.encryption_method);
    println!("access level {}", envelope.metadata.access_level);
    println!("purpose      {}", envelope.metadata.purpose);
    println!("timestamp    {}", envelope.timestamp.to_iso8601());
    println!("content hash {}", envelope.content_hash()?);
    Ok(())
}
