//! `generate`: CSV in, proof artifact out.

use anyhow::{Context, Result};
use std::path::PathBuf;
use whitelist_tree::HashAlgorithm;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// CSV file with a header line and `address,amount` rows
    #[arg(short, long, env = "WHITELIST_INPUT", default_value = "user_points.csv")]
    pub input: PathBuf,

    /// Output path for the proof artifact
    #[arg(short, long, env = "WHITELIST_OUTPUT", default_value = "whitelist-proofs.json")]
    pub output: PathBuf,

    /// Hash used for leaves and nodes (keccak256 or sha256)
    #[arg(long, env = "WHITELIST_HASH", default_value_t = HashAlgorithm::Keccak256)]
    pub hash: HashAlgorithm,
}

pub fn run(args: &Args) -> Result<()> {
    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        hash = %args.hash,
        "Generating whitelist proofs"
    );

    let artifact = whitelist_tree::generate(&args.input, &args.output, args.hash)
        .with_context(|| format!("Failed to generate proofs from {}", args.input.display()))?;

    tracing::info!(
        root = %artifact.root,
        claims = artifact.claims.len(),
        "Done"
    );
    Ok(())
}
