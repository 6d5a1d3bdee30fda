//! Seam traits for the chainseal audit hash chain.
//!
//! - `ChecksumCalculator` — pure digest over one entry's canonical form
//! - `AuditWriter`        — ingestion side: appends entries, linking each to
//!   the current chain head
//! - `AuditEntrySource`   — verification side: hands out a consistent window
//!   of entries plus their stored checksums
//!
//! The verifier depends only on these traits, never on a storage engine.

use std::collections::HashMap;

use chainseal_contracts::{
    entry::{AuditEntry, NewAuditEntry},
    error::ChainsealResult,
    options::{ChainVerificationOptions, WindowAnchor},
};

use crate::compare::secure_compare;

/// Computes a deterministic checksum for an audit entry.
///
/// Implementations must be pure: same canonical content, same digest.  They
/// hold no mutable state and may be called from any number of threads.
pub trait ChecksumCalculator: Send + Sync {
    /// Lowercase hex digest of `entry`'s canonical form.
    ///
    /// Fails only for malformed entries (empty required field, unparseable
    /// timestamp).
    fn calculate_checksum(&self, entry: &AuditEntry) -> ChainsealResult<String>;

    /// Recompute and compare against `expected` in constant time.
    fn verify_checksum(&self, entry: &AuditEntry, expected: &str) -> ChainsealResult<bool> {
        let actual = self.calculate_checksum(entry)?;
        Ok(secure_compare(&actual, expected))
    }
}

/// The ingestion-side audit sink.
///
/// Implementations are append-only: entries written here are never modified
/// or deleted.
pub trait AuditWriter: Send + Sync {
    /// Stamp `draft` with an id, link it to the current chain head, compute
    /// and persist its checksum, and return the stored entry.
    fn append(&self, draft: NewAuditEntry) -> ChainsealResult<AuditEntry>;

    /// Checksum of the most recent entry, or `None` for an empty chain.
    fn head_checksum(&self) -> ChainsealResult<Option<String>>;
}

/// A window of entries and stored checksums read from one consistent
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct WindowSnapshot {
    /// Entries in ascending chronological order.
    pub entries: Vec<AuditEntry>,

    /// Stored checksum per entry id.
    pub stored_checksums: HashMap<String, String>,

    /// Id and stored checksum of the chain entry immediately before the
    /// window, when the window starts mid-chain and is not filtered.
    pub predecessor: Option<(String, String)>,

    /// True when the first entry of the window is the head of the chain.
    pub starts_at_chain_head: bool,
}

impl WindowSnapshot {
    /// The anchor this snapshot supports for its first entry.
    pub fn anchor(&self) -> WindowAnchor {
        if self.starts_at_chain_head {
            return WindowAnchor::Genesis;
        }
        match &self.predecessor {
            Some((entry_id, checksum)) => WindowAnchor::Predecessor {
                entry_id: entry_id.clone(),
                checksum: checksum.clone(),
            },
            None => WindowAnchor::Unanchored,
        }
    }
}

/// The verification-side view of an append-only audit store.
pub trait AuditEntrySource: Send + Sync {
    /// Fetch every entry matching `options` (date bounds, actor, service)
    /// together with the stored checksums.  Limit enforcement is left to the
    /// verifier.
    fn fetch_window(&self, options: &ChainVerificationOptions) -> ChainsealResult<WindowSnapshot>;
}
