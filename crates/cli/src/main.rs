//! Whitelist Proofs CLI
//!
//! Generates the Merkle root and per-address proofs for a rewards whitelist,
//! and checks or queries a generated artifact.

mod generate;
mod proof;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "whitelist-proofs")]
#[command(about = "Merkle root and inclusion proofs for reward whitelists")]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the tree from a CSV file and write the proof artifact
    Generate(generate::Args),
    /// Check every proof in an artifact against its root
    Verify(verify::Args),
    /// Print the proof entry for one address
    Proof(proof::Args),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn main() -> Result<()> {
    // Load environment from .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Generate(args) => generate::run(&args),
        Commands::Verify(args) => verify::run(&args),
        Commands::Proof(args) => proof::run(&args),
    }
}
