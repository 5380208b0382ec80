//! Shared test helpers for registry tests.

#![allow(dead_code)]

use tallarin_types::LicenseId;

/// Parses a fixed license id.
pub fn id(s: &str) -> LicenseId {
    LicenseId::parse(s).unwrap()
}

/// Returns `n` distinct ids in a stable order.
pub fn ids(n: usize) -> Vec<LicenseId> {
    (0..n).map(|i| id(&format!("LI{i:08X}"))).collect()
}
