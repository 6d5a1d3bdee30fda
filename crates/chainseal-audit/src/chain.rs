//! Batch chain linking.
//!
//! `seal_entries` links an already-ordered batch of entries the same way the
//! writer does one at a time: each entry's `previous_checksum` is set to the
//! checksum of the entry before it, then its own checksum is computed over
//! the linked content.

use std::collections::HashMap;

use chainseal_contracts::{entry::AuditEntry, error::ChainsealResult};
use chainseal_core::{calculate_checksum, digest_prefix};
use tracing::debug;

/// Link `entries` in place and return their checksums in the same order.
///
/// `previous` is the checksum of the entry preceding the batch, or `None`
/// when the batch starts a new chain.
pub fn seal_entries(
    entries: &mut [AuditEntry],
    previous: Option<String>,
) -> ChainsealResult<Vec<String>> {
    let mut last = previous;
    let mut checksums = Vec::with_capacity(entries.len());

    for entry in entries.iter_mut() {
        entry.previous_checksum = last.take();
        let checksum = calculate_checksum(entry)?;
        debug!(
            entry_id = %entry.id,
            checksum = %digest_prefix(&checksum, 8),
            "sealed entry"
        );
        last = Some(checksum.clone());
        checksums.push(checksum);
    }

    Ok(checksums)
}

/// Pair each entry id with its checksum, as a persistence layer would store
/// them.
pub fn checksum_map(entries: &[AuditEntry], checksums: &[String]) -> HashMap<String, String> {
    entries
        .iter()
        .zip(checksums)
        .map(|(entry, checksum)| (entry.id.clone(), checksum.clone()))
        .collect()
}
