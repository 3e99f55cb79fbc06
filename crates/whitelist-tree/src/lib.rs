//! # Whitelist Tree
//!
//! Merkle commitments for reward whitelists. Takes `(address, amount)`
//! entitlements and produces:
//! - a root digest for on-chain storage
//! - one inclusion proof per address, verifiable with sorted-pair hashing
//!
//! The pipeline runs parse → encode → build → prove → write, see [`generate`].

pub mod artifact;
pub mod error;
pub mod leaf;
pub mod proof;
pub mod record;
pub mod tree;

pub use artifact::{Artifact, ClaimEntry};
pub use error::{Result, WhitelistError};
pub use leaf::{encode_record, leaf_hash, HashAlgorithm};
pub use proof::{ClaimProof, WhitelistTree};
pub use record::{parse_address, parse_amount, parse_records, read_records, EntitlementRecord};
pub use tree::{compute_root, hash_sorted_pair, verify_proof, MerkleTree};

use std::path::Path;
use tracing::info;

/// Build the artifact for already parsed records.
///
/// # Errors
/// Returns [`WhitelistError::EmptyInput`] for no records, or any error from
/// building and proving.
pub fn build_artifact(hash: HashAlgorithm, records: Vec<EntitlementRecord>) -> Result<Artifact> {
    let tree = WhitelistTree::build(hash, records)?;
    Artifact::from_tree(&tree)
}

/// Read `input`, build the tree and write the proof artifact to `output`.
///
/// Nothing is written unless every step before the write succeeds.
///
/// # Errors
/// Any [`WhitelistError`] from parsing, building, proving or writing.
pub fn generate(input: &Path, output: &Path, hash: HashAlgorithm) -> Result<Artifact> {
    let records = read_records(input)?;
    info!(input = %input.display(), records = records.len(), "Read entitlements");

    let artifact = build_artifact(hash, records)?;
    artifact.write(output)?;
    Ok(artifact)
}
