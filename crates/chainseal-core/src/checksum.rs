//! SHA-256 checksum calculation over the canonical entry form.

use sha2::{Digest, Sha256};

use chainseal_contracts::{entry::AuditEntry, error::ChainsealResult};

use crate::{canonical::CanonicalEntry, compare::secure_compare, traits::ChecksumCalculator};

/// Length of a checksum in lowercase hex characters.
pub const CHECKSUM_HEX_LEN: usize = 64;

/// The production `ChecksumCalculator`: SHA-256 over the canonical JSON
/// encoding, rendered as lowercase hex.
///
/// Stateless; construct one wherever needed or share a single value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256ChecksumCalculator;

impl ChecksumCalculator for Sha256ChecksumCalculator {
    fn calculate_checksum(&self, entry: &AuditEntry) -> ChainsealResult<String> {
        let bytes = CanonicalEntry::from_entry(entry)?.to_bytes()?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Compute the checksum of `entry` with [`Sha256ChecksumCalculator`].
pub fn calculate_checksum(entry: &AuditEntry) -> ChainsealResult<String> {
    Sha256ChecksumCalculator.calculate_checksum(entry)
}

/// Recompute the checksum of `entry` and compare it to `expected` in
/// constant time.
pub fn verify_checksum(entry: &AuditEntry, expected: &str) -> ChainsealResult<bool> {
    let actual = calculate_checksum(entry)?;
    Ok(secure_compare(&actual, expected))
}

/// The first `len` characters of a digest, for logs and failure reasons.
///
/// Full digests never appear in diagnostic text.
pub fn digest_prefix(digest: &str, len: usize) -> &str {
    match digest.char_indices().nth(len) {
        Some((end, _)) => &digest[..end],
        None => digest,
    }
}
