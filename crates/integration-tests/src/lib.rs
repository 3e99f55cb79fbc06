//! Shared fixtures for the whitelist integration tests.

use alloy::primitives::Address;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A fresh path under the OS temp dir, unique per process and call.
#[must_use]
pub fn temp_path(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "whitelist-it-{}-{n}-{name}",
        std::process::id()
    ))
}

/// Address with every byte set to `fill` except the last one.
#[must_use]
pub fn address(fill: u8, last: u8) -> Address {
    let mut bytes = [fill; 20];
    bytes[19] = last;
    Address::from(bytes)
}

/// CSV text with the usual header for the given rows.
#[must_use]
pub fn csv(rows: &[(Address, u64)]) -> String {
    let mut out = String::from("address,points\n");
    for (address, amount) in rows {
        out.push_str(&format!("0x{},{amount}\n", hex::encode(address.as_slice())));
    }
    out
}

/// Write `contents` to a fresh temp file and return its path.
///
/// # Panics
/// Panics if the file cannot be written.
#[must_use]
pub fn write_input(name: &str, contents: &str) -> PathBuf {
    let path = temp_path(name);
    std::fs::write(&path, contents).expect("write test input");
    path
}
