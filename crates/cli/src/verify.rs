//! `verify`: fold every proof in an artifact back to its root.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use whitelist_tree::artifact::format_address;
use whitelist_tree::{Artifact, HashAlgorithm};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Proof artifact to check
    #[arg(short, long, env = "WHITELIST_ARTIFACT", default_value = "whitelist-proofs.json")]
    pub artifact: PathBuf,

    /// Hash the artifact was generated with
    #[arg(long, env = "WHITELIST_HASH", default_value_t = HashAlgorithm::Keccak256)]
    pub hash: HashAlgorithm,
}

pub fn run(args: &Args) -> Result<()> {
    let artifact = Artifact::load(&args.artifact)
        .with_context(|| format!("Failed to load {}", args.artifact.display()))?;

    let invalid = artifact.invalid_claims(args.hash);
    if !invalid.is_empty() {
        for address in &invalid {
            tracing::error!(address = %format_address(address), "Proof does not match root");
        }
        bail!(
            "{} of {} proofs do not reproduce root {}",
            invalid.len(),
            artifact.claims.len(),
            artifact.root
        );
    }

    println!(
        "All {} proofs verify against root {}",
        artifact.claims.len(),
        artifact.root
    );
    Ok(())
}
