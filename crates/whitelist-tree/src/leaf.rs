//! Leaf encoding.
//!
//! A leaf is the digest of `address (20 bytes) || amount (32 bytes, big-endian)`,
//! the same tight packing Solidity's `abi.encodePacked(address, uint256)`
//! produces, so a contract can rebuild the leaf from `msg.sender` and the
//! claimed amount.

use crate::record::EntitlementRecord;
use alloy::primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of an encoded record: 20 address bytes plus a 32 byte uint256.
pub const ENCODED_RECORD_LEN: usize = 52;

/// Digest used for leaves and internal nodes. A tree uses a single algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Keccak-256, what EVM verifiers use
    #[default]
    Keccak256,
    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Hash arbitrary bytes to a 32-byte digest.
    #[must_use]
    pub fn digest(self, data: &[u8]) -> B256 {
        match self {
            Self::Keccak256 => keccak256(data),
            Self::Sha256 => {
                let hash: [u8; 32] = Sha256::digest(data).into();
                B256::from(hash)
            }
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keccak256 => f.write_str("keccak256"),
            Self::Sha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keccak256" | "keccak" => Ok(Self::Keccak256),
            "sha256" => Ok(Self::Sha256),
            other => Err(format!(
                "unknown hash algorithm `{other}` (expected keccak256 or sha256)"
            )),
        }
    }
}

/// Canonical byte encoding of a record.
#[must_use]
pub fn encode_record(record: &EntitlementRecord) -> [u8; ENCODED_RECORD_LEN] {
    let mut encoded = [0u8; ENCODED_RECORD_LEN];
    encoded[..20].copy_from_slice(record.address.as_slice());
    encoded[20..].copy_from_slice(&record.amount.to_be_bytes::<32>());
    encoded
}

/// Leaf digest of a record.
#[must_use]
pub fn leaf_hash(hash: HashAlgorithm, record: &EntitlementRecord) -> B256 {
    hash.digest(&encode_record(record))
}
