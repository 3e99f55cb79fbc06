//! Entitlement records and the CSV input parser.
//!
//! Input is UTF-8 text: one header line, then one `<address>,<amount>` row
//! per line. Rows keep their input order so that re-running the generator
//! on the same file yields a byte-identical artifact.

use crate::error::{Result, WhitelistError};
use alloy::primitives::{Address, U256};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};

/// Number of hex characters in an address.
const ADDRESS_HEX_LEN: usize = 40;

/// One `(address, amount)` entitlement taken from a single input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementRecord {
    /// Account allowed to claim
    pub address: Address,
    /// Entitled amount, as an on-chain uint256
    pub amount: U256,
    /// 1-based line number of the row in the input
    pub line: usize,
}

impl EntitlementRecord {
    /// Create a record that did not come from an input file.
    #[must_use]
    pub fn new(address: Address, amount: U256) -> Self {
        Self {
            address,
            amount,
            line: 0,
        }
    }
}

/// Parses an address token.
///
/// Accepts 40 hex digits with or without a `0x` prefix. Mixed-case input
/// must carry a valid EIP-55 checksum.
///
/// # Errors
/// Returns a human readable reason when the token is not a valid address.
pub fn parse_address(token: &str) -> std::result::Result<Address, String> {
    let digits = token.strip_prefix("0x").unwrap_or(token);
    if digits.len() != ADDRESS_HEX_LEN {
        return Err(format!(
            "invalid address length: expected {ADDRESS_HEX_LEN} hex chars, got {}",
            digits.len()
        ));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes)
        .map_err(|e| format!("invalid address hex `{token}`: {e}"))?;
    let address = Address::from(bytes);

    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower {
        let checksummed = address.to_checksum(None);
        if checksummed[2..] != *digits {
            return Err(format!("invalid address checksum `{token}`"));
        }
    }

    Ok(address)
}

/// Parses an amount token as a non-negative decimal integer that fits in 256 bits.
///
/// # Errors
/// Returns a human readable reason for signs, hex, exponents, empty tokens
/// and values above `2^256 - 1`.
pub fn parse_amount(token: &str) -> std::result::Result<U256, String> {
    if token.is_empty() {
        return Err("missing amount".to_string());
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("amount `{token}` is not a non-negative integer"));
    }
    U256::from_str_radix(token, 10).map_err(|e| format!("amount `{token}` out of range: {e}"))
}

/// Parses one data row. `line` is only used for error reporting.
///
/// # Errors
/// Returns [`WhitelistError::MalformedRecord`] for a wrong field count or an
/// invalid address or amount.
pub fn parse_record(row: &str, line: usize) -> Result<EntitlementRecord> {
    let malformed = |reason: String| WhitelistError::MalformedRecord { line, reason };

    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() != 2 {
        return Err(malformed(format!(
            "expected 2 fields (address,amount), got {}",
            fields.len()
        )));
    }

    let address = parse_address(fields[0]).map_err(malformed)?;
    let amount = parse_amount(fields[1]).map_err(malformed)?;

    Ok(EntitlementRecord {
        address,
        amount,
        line,
    })
}

/// Parses the full input text into records, in input order.
///
/// The first line is a header and is skipped. Blank lines are ignored.
///
/// # Errors
/// Fails on the first malformed row, or when an address is repeated.
pub fn parse_records(input: &str) -> Result<Vec<EntitlementRecord>> {
    let mut records = Vec::new();
    let mut seen: HashMap<Address, usize> = HashMap::new();

    for (idx, row) in input.lines().enumerate().skip(1) {
        let line = idx + 1;
        if row.trim().is_empty() {
            continue;
        }

        let record = parse_record(row, line)?;
        if let Some(&first_line) = seen.get(&record.address) {
            return Err(WhitelistError::DuplicateAddress {
                line,
                address: record.address,
                first_line,
            });
        }
        seen.insert(record.address, line);
        records.push(record);
    }

    debug!(records = records.len(), "Parsed entitlement records");
    Ok(records)
}

/// Reads and parses an input file.
///
/// # Errors
/// Returns [`WhitelistError::Read`] if the file cannot be read, otherwise
/// any error from [`parse_records`].
#[instrument]
pub fn read_records(path: &Path) -> Result<Vec<EntitlementRecord>> {
    let input = std::fs::read_to_string(path).map_err(|source| WhitelistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&input)
}
