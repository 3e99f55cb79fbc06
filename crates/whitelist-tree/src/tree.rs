//! Sorted-pair Merkle tree.
//!
//! The tree is stored as one vector of digests per level, leaves first.
//! Leaves are sorted by byte value before building, so the root does not
//! depend on input order. Parents are `hash(min(a, b) || max(a, b))`, which
//! lets a verifier fold a proof without knowing left/right positions.
//!
//! An unpaired last node on a level is promoted to the next level unchanged
//! and contributes no sibling to proofs passing through it.

use crate::error::{Result, WhitelistError};
use crate::leaf::HashAlgorithm;
use alloy::primitives::B256;
use tracing::debug;

/// Hash two nodes after ordering them by byte value.
#[must_use]
pub fn hash_sorted_pair(hash: HashAlgorithm, a: &B256, b: &B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(lo.as_slice());
    data[32..].copy_from_slice(hi.as_slice());
    hash.digest(&data)
}

/// Build the next level up from `level`.
fn next_level(hash: HashAlgorithm, level: &[B256]) -> Vec<B256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_sorted_pair(hash, left, right),
            [single] => *single,
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

/// A fully materialized sorted-pair Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    hash: HashAlgorithm,
    /// `levels[0]` holds the sorted leaves, the last level holds the root.
    levels: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Build a tree over `leaves`.
    ///
    /// # Errors
    /// Returns [`WhitelistError::EmptyInput`] if `leaves` is empty.
    pub fn new(hash: HashAlgorithm, mut leaves: Vec<B256>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(WhitelistError::EmptyInput);
        }

        leaves.sort_unstable();
        let mut levels = vec![leaves];

        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let parent = next_level(hash, level);
            debug!(
                level = levels.len(),
                nodes = parent.len(),
                "Built tree level"
            );
            levels.push(parent);
        }

        Ok(Self { hash, levels })
    }

    /// Hash algorithm the tree was built with.
    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    /// Root digest.
    #[must_use]
    pub fn root(&self) -> B256 {
        // levels is never empty and the top level always has one node
        self.levels[self.levels.len() - 1][0]
    }

    /// Sorted leaves.
    #[must_use]
    pub fn leaves(&self) -> &[B256] {
        &self.levels[0]
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of hashing levels above the leaves.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// All levels, leaves first.
    #[must_use]
    pub fn levels(&self) -> &[Vec<B256>] {
        &self.levels
    }

    /// Position of `leaf` among the sorted leaves.
    #[must_use]
    pub fn position(&self, leaf: &B256) -> Option<usize> {
        self.levels[0].binary_search(leaf).ok()
    }

    /// Sibling digests for the leaf at `index`, leaf to root.
    ///
    /// Levels where the node on the path was promoted contribute nothing.
    /// Returns `None` if `index` is out of range.
    #[must_use]
    pub fn proof(&self, index: usize) -> Option<Vec<B256>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut proof = Vec::with_capacity(self.depth());
        let mut pos = index;
        for level in &self.levels[..self.levels.len() - 1] {
            if let Some(sibling) = level.get(pos ^ 1) {
                proof.push(*sibling);
            }
            pos /= 2;
        }
        Some(proof)
    }

    /// Proof for a leaf digest, if the leaf is in the tree.
    #[must_use]
    pub fn proof_for_leaf(&self, leaf: &B256) -> Option<Vec<B256>> {
        self.position(leaf).and_then(|index| self.proof(index))
    }
}

/// Fold `proof` onto `leaf` with the sorted-pair rule.
#[must_use]
pub fn compute_root(hash: HashAlgorithm, leaf: B256, proof: &[B256]) -> B256 {
    proof
        .iter()
        .fold(leaf, |acc, sibling| hash_sorted_pair(hash, &acc, sibling))
}

/// Check that `proof` takes `leaf` to `root`.
#[must_use]
pub fn verify_proof(hash: HashAlgorithm, leaf: B256, proof: &[B256], root: B256) -> bool {
    compute_root(hash, leaf, proof) == root
}
