//! Proof artifact: the JSON document handed to the deployment scripts.
//!
//! ```json
//! {
//! 	"root": "0x…",
//! 	"proofs": {
//! 		"0x…address": { "amount": "100", "proof": ["0x…", "0x…"] }
//! 	}
//! }
//! ```
//!
//! `proofs` keeps the input order of the records, so the same input file
//! always produces the same bytes.

use crate::error::{Result, WhitelistError};
use crate::leaf::{leaf_hash, HashAlgorithm};
use crate::proof::WhitelistTree;
use crate::record::EntitlementRecord;
use crate::tree::verify_proof;
use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// One claimable entitlement in the artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    /// Claiming account, stored as the map key
    #[serde(skip)]
    pub address: Address,
    /// Entitled amount as a decimal string
    #[serde(with = "decimal_u256")]
    pub amount: U256,
    /// Sibling digests, leaf to root
    #[serde(with = "proof_vec_serde")]
    pub proof: Vec<B256>,
}

impl ClaimEntry {
    /// Leaf digest of this entry under `hash`.
    #[must_use]
    pub fn leaf(&self, hash: HashAlgorithm) -> B256 {
        leaf_hash(hash, &EntitlementRecord::new(self.address, self.amount))
    }
}

/// Root commitment plus one proof per address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Merkle root
    #[serde(with = "hex_bytes32")]
    pub root: B256,
    /// Entries keyed by lower-case address, in input order
    #[serde(rename = "proofs", with = "claims_map")]
    pub claims: Vec<ClaimEntry>,
}

impl Artifact {
    /// Collect the root and every proof from a built tree.
    ///
    /// # Errors
    /// Propagates [`WhitelistTree::proofs`] failures.
    pub fn from_tree(tree: &WhitelistTree) -> Result<Self> {
        let claims = tree
            .proofs()?
            .into_iter()
            .map(|claim| ClaimEntry {
                address: claim.address,
                amount: claim.amount,
                proof: claim.proof,
            })
            .collect();

        Ok(Self {
            root: tree.root(),
            claims,
        })
    }

    /// Entry for `address`.
    ///
    /// # Errors
    /// Returns [`WhitelistError::AddressNotFound`] if the address has no entry.
    pub fn get(&self, address: &Address) -> Result<&ClaimEntry> {
        self.claims
            .iter()
            .find(|entry| entry.address == *address)
            .ok_or(WhitelistError::AddressNotFound(*address))
    }

    /// Addresses whose proofs do not fold to `root` under `hash`.
    #[must_use]
    pub fn invalid_claims(&self, hash: HashAlgorithm) -> Vec<Address> {
        self.claims
            .iter()
            .filter(|entry| !verify_proof(hash, entry.leaf(hash), &entry.proof, self.root))
            .map(|entry| entry.address)
            .collect()
    }

    /// Tab-indented JSON encoding.
    ///
    /// # Errors
    /// Returns [`WhitelistError::Serialize`] if encoding fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }

    /// Decode an artifact from JSON bytes.
    ///
    /// # Errors
    /// Returns [`WhitelistError::InvalidArtifact`] for malformed documents.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| WhitelistError::InvalidArtifact(e.to_string()))
    }

    /// Write the artifact to `path` atomically.
    ///
    /// # Errors
    /// Returns [`WhitelistError::Write`] on I/O failure. No file is left at
    /// `path` (or at its temporary sibling) when that happens.
    #[instrument(skip(self), fields(claims = self.claims.len()))]
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        write_atomic(path, &json)?;
        info!(path = %path.display(), bytes = json.len(), "Wrote proof artifact");
        Ok(())
    }

    /// Read an artifact from `path`.
    ///
    /// # Errors
    /// Returns [`WhitelistError::Read`] or [`WhitelistError::InvalidArtifact`].
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| WhitelistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&bytes)
    }
}

/// Lower-case `0x`-prefixed address.
#[must_use]
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Lower-case `0x`-prefixed digest.
#[must_use]
pub fn format_digest(digest: &B256) -> String {
    format!("0x{}", hex::encode(digest.as_slice()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `contents` to a temporary sibling of `path`, then rename it into place.
///
/// # Errors
/// Returns [`WhitelistError::Write`]; the temporary file is removed first.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp = temp_path(path);

    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp)?;
        file.write_all(contents)?;
        file.flush()?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp, path)
    })();

    result.map_err(|source| {
        if temp.exists() {
            if let Err(e) = std::fs::remove_file(&temp) {
                warn!(path = %temp.display(), error = %e, "Failed to remove temporary file");
            }
        }
        WhitelistError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Hex encoding for the root digest
mod hex_bytes32 {
    use alloy::primitives::B256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(digest: &B256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_digest(digest))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<B256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_digest(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_digest(s: &str) -> std::result::Result<B256, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(digits, &mut bytes).map_err(|e| format!("invalid digest `{s}`: {e}"))?;
    Ok(B256::from(bytes))
}

/// Serde for `Vec<B256>` as an array of hex strings
mod proof_vec_serde {
    use alloy::primitives::B256;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(data: &[B256], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hex_strings: Vec<String> = data.iter().map(super::format_digest).collect();
        hex_strings.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<B256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_strings: Vec<String> = Vec::deserialize(deserializer)?;
        hex_strings
            .iter()
            .map(|s| super::parse_digest(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Serde for amounts as decimal strings
mod decimal_u256 {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        crate::record::parse_amount(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde for the claims list as an address-keyed map that keeps entry order
mod claims_map {
    use super::ClaimEntry;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::collections::HashSet;
    use std::fmt;

    pub fn serialize<S>(claims: &[ClaimEntry], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(claims.len()))?;
        for entry in claims {
            map.serialize_entry(&super::format_address(&entry.address), entry)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<ClaimEntry>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ClaimsVisitor)
    }

    struct ClaimsVisitor;

    impl<'de> Visitor<'de> for ClaimsVisitor {
        type Value = Vec<ClaimEntry>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from address to {amount, proof}")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut claims = Vec::with_capacity(access.size_hint().unwrap_or(0));
            let mut seen = HashSet::new();

            while let Some((key, mut entry)) = access.next_entry::<String, ClaimEntry>()? {
                let address =
                    crate::record::parse_address(&key).map_err(serde::de::Error::custom)?;
                if !seen.insert(address) {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate address {key}"
                    )));
                }
                entry.address = address;
                claims.push(entry);
            }

            Ok(claims)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("whitelist-tree-{}-{name}", std::process::id()))
    }

    fn sample_tree() -> WhitelistTree {
        let records = (1..=3u8)
            .map(|i| EntitlementRecord {
                address: Address::repeat_byte(i),
                amount: U256::from(u64::from(i) * 100),
                line: usize::from(i) + 1,
            })
            .collect();
        WhitelistTree::build(HashAlgorithm::Keccak256, records).unwrap()
    }

    #[test]
    fn test_json_layout() {
        let artifact = Artifact::from_tree(&sample_tree()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&artifact.to_json().unwrap()).unwrap();

        let root = json["root"].as_str().unwrap();
        assert!(root.starts_with("0x"));
        assert_eq!(root.len(), 66);
        assert_eq!(root, root.to_lowercase());

        let entry = &json["proofs"]["0x0101010101010101010101010101010101010101"];
        assert_eq!(entry["amount"], "100");
        let proof = entry["proof"].as_array().unwrap();
        assert!(!proof.is_empty());
        assert!(proof.iter().all(|p| p.as_str().unwrap().len() == 66));
    }

    #[test]
    fn test_json_keeps_input_order_and_tabs() {
        let artifact = Artifact::from_tree(&sample_tree()).unwrap();
        let text = String::from_utf8(artifact.to_json().unwrap()).unwrap();

        assert!(text.starts_with("{\n\t\"root\""));
        let key = |byte: u8| format!("\"{}\":", format_address(&Address::repeat_byte(byte)));
        let first = text.find(&key(1)).unwrap();
        let second = text.find(&key(2)).unwrap();
        let third = text.find(&key(3)).unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let artifact = Artifact::from_tree(&sample_tree()).unwrap();
        let decoded = Artifact::from_json(&artifact.to_json().unwrap()).unwrap();
        assert_eq!(decoded, artifact);
    }

    #[test]
    fn test_invalid_claims() {
        let mut artifact = Artifact::from_tree(&sample_tree()).unwrap();
        assert!(artifact.invalid_claims(HashAlgorithm::Keccak256).is_empty());

        artifact.claims[1].amount += U256::from(1u64);
        assert_eq!(
            artifact.invalid_claims(HashAlgorithm::Keccak256),
            vec![Address::repeat_byte(2)]
        );
    }

    #[test]
    fn test_get_entry() {
        let artifact = Artifact::from_tree(&sample_tree()).unwrap();
        assert_eq!(
            artifact.get(&Address::repeat_byte(3)).unwrap().amount,
            U256::from(300u64)
        );
        assert!(matches!(
            artifact.get(&Address::repeat_byte(9)),
            Err(WhitelistError::AddressNotFound(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_bad_documents() {
        let bad_root = br#"{"root": "0x1234", "proofs": {}}"#;
        assert!(matches!(
            Artifact::from_json(bad_root),
            Err(WhitelistError::InvalidArtifact(_))
        ));

        let bad_amount = format!(
            r#"{{"root": "0x{}", "proofs": {{"0x{}": {{"amount": "-1", "proof": []}}}}}}"#,
            "00".repeat(32),
            "11".repeat(20)
        );
        assert!(Artifact::from_json(bad_amount.as_bytes()).is_err());

        let dup = format!(
            r#"{{"root": "0x{r}", "proofs": {{"0x{a}": {{"amount": "1", "proof": []}}, "0x{a}": {{"amount": "2", "proof": []}}}}}}"#,
            r = "00".repeat(32),
            a = "11".repeat(20)
        );
        assert!(Artifact::from_json(dup.as_bytes()).is_err());
    }

    #[test]
    fn test_write_and_load() {
        let path = temp_file("write-and-load.json");
        let artifact = Artifact::from_tree(&sample_tree()).unwrap();

        artifact.write(&path).unwrap();
        assert!(!temp_path(&path).exists());
        assert_eq!(Artifact::load(&path).unwrap(), artifact);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_missing_directory() {
        let path = temp_file("no-such-dir").join("out.json");
        let artifact = Artifact::from_tree(&sample_tree()).unwrap();

        let err = artifact.write(&path).unwrap_err();
        assert!(matches!(err, WhitelistError::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_failure_leaves_no_temp_file() {
        // Renaming a file over a directory fails after the temp file exists.
        let path = temp_file("occupied-by-dir");
        std::fs::create_dir_all(&path).unwrap();

        let err = write_atomic(&path, b"{}").unwrap_err();
        assert!(matches!(err, WhitelistError::Write { .. }));
        assert!(!temp_path(&path).exists());
        assert!(path.is_dir());

        std::fs::remove_dir(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = Artifact::load(&temp_file("missing.json")).unwrap_err();
        assert!(matches!(err, WhitelistError::Read { .. }));
    }
}
