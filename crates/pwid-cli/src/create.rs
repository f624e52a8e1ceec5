//! # Create Subcommand
//!
//! Runs the full intake flow over a draft file: wizard gates, package
//! build, store create, external submission, and the `.pwid` file write.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Deserialize;

use pwid_core::{AccessLevel, PersonalData};
use pwid_crypto::{PassthroughCredentialEncryption, SigningKeyPair};
use pwid_flow::{IntakeWizard, LedgerStub, WizardForm};

/// Arguments for the create subcommand.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Path to the intake JSON file.
    pub intake: PathBuf,

    /// Request store file.
    #[arg(long, default_value = "requests.json")]
    pub store: PathBuf,

    /// Directory the `.pwid` package file is written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// 64-char hex seed for the signing key. A fresh key is generated
    /// when absent; its public half is printed either way.
    #[arg(long)]
    pub signing_seed: Option<String>,
}

/// The on-disk intake draft: the operator's form fields plus the
/// candidate's personal data.
#[derive(Debug, Deserialize)]
struct IntakeFile {
    #[serde(default)]
    credential_pem: Option<String>,
    #[serde(default)]
    login: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    employer_id: String,
    purpose: String,
    #[serde(default)]
    access_level: Option<AccessLevel>,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    agreement_affirmed: bool,
    candidate: PersonalData,
}

pub fn run(args: CreateArgs) -> anyhow::Result<()> {
    let content = fs::read_to_string(&args.intake)
        .with_context(|| format!("reading intake file {}", args.intake.display()))?;
    let intake: IntakeFile =
        serde_json::from_str(&content).context("parsing intake file")?;

    let signer = match &args.signing_seed {
        Some(hex) => SigningKeyPair::from_seed(&parse_seed(hex)?),
        None => SigningKeyPair::generate(),
    };

    let form = WizardForm {
        credential_pem: intake.credential_pem,
        login: intake.login,
        password: intake.password,
        employer_id: intake.employer_id,
        purpose: intake.purpose,
        access_level: intake.access_level,
        comment: intake.comment,
        agreement_affirmed: intake.agreement_affirmed,
    };

    let mut store = crate::open_store(&args.store)?;
    let mut wizard = IntakeWizard::new(intake.candidate);
    wizard.advance(&form)?;
    wizard.advance(&form)?;
    let outcome = wizard.submit(
        &form,
        &mut store,
        &signer,
        &PassthroughCredentialEncryption,
        &LedgerStub,
    )?;

    let package_path = args.out_dir.join(format!("{}.pwid", outcome.request.id));
    fs::write(&package_path, outcome.envelope.to_json()?)
        .with_context(|| format!("writing package to {}", package_path.display()))?;
    tracing::info!(request_id = %outcome.request.id, "intake complete");

    println!("created     {}", outcome.request.id);
    println!("status      {}", outcome.request.status);
    println!("tx          {}", outcome.transaction);
    println!("package     {}", package_path.display());
    println!("pwid hash   {}", outcome.request.pwid_hash);
    println!("public key  {}", signer.public_key());
    if let Some(key) = &outcome.symmetric_key {
        // Symmetric path: the key is not persisted anywhere else.
        println!("content key {}", key.to_hex());
    }
    Ok(())
}

fn parse_seed(hex: &str) -> anyhow::Result<[u8; 32]> {
    let hex = hex.trim();
    anyhow::ensure!(hex.is_ascii(), "signing seed must be ASCII hex");
    anyhow::ensure!(hex.len() == 64, "signing seed must be 64 hex chars");
    let mut seed = [0u8; 32];
    for (i, b) in seed.iter_mut().enumerate() {
        *b = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
            .context("signing seed is not valid hex")?;
    }
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwid_pack::PwidEnvelope;
    use pwid_store::RequestStatus;

    #[test]
    fn test_parse_seed() {
        let seed = parse_seed(&"07".repeat(32)).unwrap();
        assert_eq!(seed, [7u8; 32]);
        assert!(parse_seed("abcd").is_err());
        assert!(parse_seed(&"zz".repeat(32)).is_err());
        // Multibyte input with a passing byte length must error, not panic.
        assert!(parse_seed(&format!("€{}", "a".repeat(61))).is_err());
    }

    #[test]
    fn test_create_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let intake_path = dir.path().join("intake.json");
        let store_path = dir.path().join("requests.json");

        let intake = serde_json::json!({
            "login": "hr-operator",
            "password": "secret",
            "employer_id": "ACME-CORP",
            "purpose": "background_check",
            "access_level": "basic",
            "agreement_affirmed": true,
            "candidate": {
                "basic": {
                    "full_name": "Ivan Ivanov",
                    "birth_date": "1990-04-02",
                    "passport": "1234 567890",
                    "phone": "+7 900 000-00-00",
                    "email": "ivan@example.com"
                }
            }
        });
        fs::write(&intake_path, intake.to_string()).unwrap();

        let seed = "11".repeat(32);
        run(CreateArgs {
            intake: intake_path,
            store: store_path.clone(),
            out_dir: dir.path().to_path_buf(),
            signing_seed: Some(seed.clone()),
        })
        .unwrap();

        let store = crate::open_store(&store_path).unwrap();
        assert_eq!(store.len(), 1);
        let request = store.list(|_| true).remove(0);
        assert_eq!(request.status, RequestStatus::Submitted);
        assert!(request.blockchain_tx.is_some());

        // The written package parses, verifies, and matches the record.
        let package_path = dir.path().join(format!("{}.pwid", request.id));
        let envelope =
            PwidEnvelope::from_json(&fs::read_to_string(&package_path).unwrap()).unwrap();
        assert_eq!(envelope.request_id, request.id);
        assert_eq!(envelope.content_hash().unwrap(), request.pwid_hash);
        let signer = SigningKeyPair::from_seed(&parse_seed(&seed).unwrap());
        envelope.verify(&signer.public_key()).unwrap();
    }
}
