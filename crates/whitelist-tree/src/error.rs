//! Error taxonomy for whitelist tree generation.

use alloy::primitives::Address;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing, building, proving or writing.
#[derive(Error, Debug)]
pub enum WhitelistError {
    /// An input row could not be turned into an entitlement record.
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// The same address appears on more than one input row.
    #[error("Duplicate address {address} on line {line} (first seen on line {first_line})")]
    DuplicateAddress {
        line: usize,
        address: Address,
        first_line: usize,
    },

    #[error("Input contains no entitlement records")]
    EmptyInput,

    /// Proof lookup for an address that is not part of the committed set.
    #[error("Address {0} is not part of the whitelist")]
    AddressNotFound(Address),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// A freshly generated proof did not fold back to the root.
    #[error("Proof for {0} does not reproduce the root")]
    InconsistentProof(Address),
}

impl WhitelistError {
    /// True for every error caused by a bad input row.
    #[must_use]
    pub fn is_malformed_record(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecord { .. } | Self::DuplicateAddress { .. }
        )
    }

    /// Line number of the offending input row, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedRecord { line, .. } | Self::DuplicateAddress { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = WhitelistError> = std::result::Result<T, E>;
