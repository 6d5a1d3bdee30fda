//! Exported chain snapshots.
//!
//! `ChainExport` is the serializable form of a stored chain: the entries in
//! append order plus the stored checksum of each.  The demo CLI reads and
//! writes this shape as JSON.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainseal_contracts::entry::AuditEntry;

/// A sealed copy of an audit chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainExport {
    /// Entries in chain order (head first).
    pub entries: Vec<AuditEntry>,

    /// Stored checksum per entry id.  Ordered for stable output.
    pub checksums: BTreeMap<String, String>,

    /// Wall-clock time (UTC) the export was taken.  Hand-written inputs may
    /// omit it.
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,

    /// Checksum of the last entry, or `None` for an empty chain.  A compact
    /// commitment to the whole chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_checksum: Option<String>,
}

impl ChainExport {
    /// The checksum lookup in the shape `verify_chain` expects.
    pub fn stored_checksums(&self) -> HashMap<String, String> {
        self.checksums
            .iter()
            .map(|(id, checksum)| (id.clone(), checksum.clone()))
            .collect()
    }
}
