//! # pwid CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// pwid Stack CLI — employer data-request toolchain.
///
/// Creates and submits personal-data requests, lists and inspects the
/// request store, runs the closure flow, and verifies package signatures.
#[derive(Parser, Debug)]
#[command(name = "pwid", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the intake wizard over a draft file and submit the request.
    Create(pwid_cli::create::CreateArgs),
    /// List stored requests.
    List(pwid_cli::list::ListArgs),
    /// Show one request without its personal data.
    Show(pwid_cli::show::ShowArgs),
    /// Close a request with an update or a rejection.
    Close(pwid_cli::close::CloseArgs),
    /// Verify a `.pwid` package file.
    Verify(pwid_cli::verify::VerifyArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create(args) => pwid_cli::create::run(args),
        Commands::List(args) => pwid_cli::list::run(args),
        Commands::Show(args) => pwid_cli::show::run(args),
        Commands::Close(args) => pwid_cli::close::run(args),
        Commands::Verify(args) => pwid_cli::verify::run(args),
    }
}
