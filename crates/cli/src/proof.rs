//! `proof`: print the claim entry for one address.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::path::PathBuf;
use whitelist_tree::artifact::{format_address, format_digest};
use whitelist_tree::{parse_address, Artifact, HashAlgorithm};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Address to look up
    #[arg(long, value_parser = parse_address)]
    pub address: Address,

    /// Proof artifact to read
    #[arg(short, long, env = "WHITELIST_ARTIFACT", default_value = "whitelist-proofs.json")]
    pub artifact: PathBuf,

    /// Hash the artifact was generated with, used to report the leaf
    #[arg(long, env = "WHITELIST_HASH", default_value_t = HashAlgorithm::Keccak256)]
    pub hash: HashAlgorithm,
}

pub fn run(args: &Args) -> Result<()> {
    let artifact = Artifact::load(&args.artifact)
        .with_context(|| format!("Failed to load {}", args.artifact.display()))?;
    let entry = artifact.get(&args.address)?;

    let output = serde_json::json!({
        "address": format_address(&entry.address),
        "amount": entry.amount.to_string(),
        "leaf": format_digest(&entry.leaf(args.hash)),
        "proof": entry.proof.iter().map(format_digest).collect::<Vec<_>>(),
        "root": format_digest(&artifact.root),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
