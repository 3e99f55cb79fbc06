//! Per-address inclusion proofs.
//!
//! [`WhitelistTree`] ties the entitlement records to the sorted-pair
//! [`MerkleTree`] built over their leaves and answers proof queries by
//! address.

use crate::error::{Result, WhitelistError};
use crate::leaf::{leaf_hash, HashAlgorithm};
use crate::record::EntitlementRecord;
use crate::tree::{verify_proof, MerkleTree};
use alloy::primitives::{Address, B256, U256};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Everything a claimant needs to prove one entitlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimProof {
    /// Claiming account
    pub address: Address,
    /// Entitled amount
    pub amount: U256,
    /// Leaf digest of `(address, amount)`
    pub leaf: B256,
    /// Sibling digests, leaf to root
    pub proof: Vec<B256>,
}

impl ClaimProof {
    /// Check this proof against `root`.
    #[must_use]
    pub fn verify(&self, hash: HashAlgorithm, root: B256) -> bool {
        verify_proof(hash, self.leaf, &self.proof, root)
    }
}

/// Merkle commitment over a set of entitlement records.
#[derive(Debug, Clone)]
pub struct WhitelistTree {
    tree: MerkleTree,
    /// Records in input order
    records: Vec<EntitlementRecord>,
    /// Leaf digest for each record, same order as `records`
    leaves: Vec<B256>,
    /// Address to position in `records`
    index: HashMap<Address, usize>,
}

impl WhitelistTree {
    /// Encode every record and build the tree.
    ///
    /// # Errors
    /// Returns [`WhitelistError::EmptyInput`] for no records and
    /// [`WhitelistError::DuplicateAddress`] if an address repeats.
    #[instrument(skip(records), fields(records = records.len()))]
    pub fn build(hash: HashAlgorithm, records: Vec<EntitlementRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if let Some(first) = index.insert(record.address, i) {
                return Err(WhitelistError::DuplicateAddress {
                    line: record.line,
                    address: record.address,
                    first_line: records[first].line,
                });
            }
        }

        let leaves: Vec<B256> = records.iter().map(|r| leaf_hash(hash, r)).collect();
        let tree = MerkleTree::new(hash, leaves.clone())?;

        info!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            root = %tree.root(),
            "Built whitelist tree"
        );

        Ok(Self {
            tree,
            records,
            leaves,
            index,
        })
    }

    /// Root commitment.
    #[must_use]
    pub fn root(&self) -> B256 {
        self.tree.root()
    }

    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.tree.hash_algorithm()
    }

    /// Underlying Merkle tree.
    #[must_use]
    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    /// Records in input order.
    #[must_use]
    pub fn records(&self) -> &[EntitlementRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Proof for one address.
    ///
    /// # Errors
    /// Returns [`WhitelistError::AddressNotFound`] if the address is not in the set.
    pub fn proof(&self, address: &Address) -> Result<ClaimProof> {
        let &i = self
            .index
            .get(address)
            .ok_or(WhitelistError::AddressNotFound(*address))?;
        self.proof_at(i)
    }

    fn proof_at(&self, i: usize) -> Result<ClaimProof> {
        let record = &self.records[i];
        let leaf = self.leaves[i];
        let proof = self
            .tree
            .proof_for_leaf(&leaf)
            .ok_or(WhitelistError::AddressNotFound(record.address))?;

        Ok(ClaimProof {
            address: record.address,
            amount: record.amount,
            leaf,
            proof,
        })
    }

    /// Proofs for every record, in input order.
    ///
    /// Each proof is folded back to the root before it is returned.
    ///
    /// # Errors
    /// Returns [`WhitelistError::InconsistentProof`] if a proof does not
    /// reproduce the root.
    #[instrument(skip(self), fields(records = self.records.len()))]
    pub fn proofs(&self) -> Result<Vec<ClaimProof>> {
        let hash = self.hash_algorithm();
        let root = self.root();

        (0..self.records.len())
            .map(|i| {
                let claim = self.proof_at(i)?;
                if !claim.verify(hash, root) {
                    return Err(WhitelistError::InconsistentProof(claim.address));
                }
                Ok(claim)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::hash_sorted_pair;

    const H: HashAlgorithm = HashAlgorithm::Keccak256;

    fn addr(last: u8, fill: u8) -> Address {
        let mut bytes = [fill; 20];
        bytes[19] = last;
        Address::from(bytes)
    }

    fn record(address: Address, amount: u64, line: usize) -> EntitlementRecord {
        EntitlementRecord {
            address,
            amount: U256::from(amount),
            line,
        }
    }

    #[test]
    fn test_two_record_scenario() {
        let a = record(addr(0x01, 0xaa), 100, 2);
        let b = record(addr(0x02, 0xbb), 50, 3);
        let leaf_a = leaf_hash(H, &a);
        let leaf_b = leaf_hash(H, &b);

        let tree = WhitelistTree::build(H, vec![a, b]).unwrap();

        assert_eq!(tree.root(), hash_sorted_pair(H, &leaf_a, &leaf_b));
        assert_eq!(tree.proof(&a.address).unwrap().proof, vec![leaf_b]);
        assert_eq!(tree.proof(&b.address).unwrap().proof, vec![leaf_a]);
    }

    #[test]
    fn test_single_record() {
        let a = record(addr(0x01, 0xaa), 100, 2);
        let tree = WhitelistTree::build(H, vec![a]).unwrap();

        assert_eq!(tree.root(), leaf_hash(H, &a));
        let claim = tree.proof(&a.address).unwrap();
        assert!(claim.proof.is_empty());
        assert_eq!(claim.amount, U256::from(100u64));
    }

    #[test]
    fn test_empty_records() {
        assert!(matches!(
            WhitelistTree::build(H, vec![]),
            Err(WhitelistError::EmptyInput)
        ));
    }

    #[test]
    fn test_unknown_address() {
        let tree = WhitelistTree::build(H, vec![record(addr(1, 0), 1, 2)]).unwrap();
        let missing = addr(2, 0);
        assert!(matches!(
            tree.proof(&missing),
            Err(WhitelistError::AddressNotFound(a)) if a == missing
        ));
    }

    #[test]
    fn test_duplicate_records_rejected() {
        let records = vec![record(addr(1, 0), 1, 2), record(addr(1, 0), 2, 5)];
        let err = WhitelistTree::build(H, records).unwrap_err();
        assert!(matches!(
            err,
            WhitelistError::DuplicateAddress {
                line: 5,
                first_line: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_proofs_in_input_order() {
        let records: Vec<EntitlementRecord> = (0..7u8)
            .rev()
            .map(|i| record(addr(i, 0x10), u64::from(i) * 10, usize::from(i) + 2))
            .collect();
        let tree = WhitelistTree::build(H, records.clone()).unwrap();
        let proofs = tree.proofs().unwrap();

        assert_eq!(proofs.len(), records.len());
        for (claim, record) in proofs.iter().zip(&records) {
            assert_eq!(claim.address, record.address);
            assert_eq!(claim.amount, record.amount);
            assert!(claim.verify(H, tree.root()));
        }
    }

    #[test]
    fn test_sha256_tree() {
        let records = vec![record(addr(1, 0), 1, 2), record(addr(2, 0), 2, 3)];
        let keccak = WhitelistTree::build(HashAlgorithm::Keccak256, records.clone()).unwrap();
        let sha = WhitelistTree::build(HashAlgorithm::Sha256, records).unwrap();

        assert_ne!(keccak.root(), sha.root());
        for claim in sha.proofs().unwrap() {
            assert!(claim.verify(HashAlgorithm::Sha256, sha.root()));
            assert!(!claim.verify(HashAlgorithm::Keccak256, sha.root()));
        }
    }
}
