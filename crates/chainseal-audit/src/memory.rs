//! In-memory implementation of `AuditWriter` and `AuditEntrySource`.
//!
//! `InMemoryAuditStore` is the reference audit store.  It keeps entries and
//! their stored checksums behind one `Mutex`, so a window fetched for
//! verification always pairs entries with the checksums of the same
//! snapshot.
//!
//! Use `export()` to obtain a serializable `ChainExport`, and
//! `fetch_window()` to hand a window to `ChainVerifier`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use chainseal_contracts::{
    entry::{new_entry_id, AuditEntry, NewAuditEntry},
    error::{ChainsealError, ChainsealResult},
    options::ChainVerificationOptions,
};
use chainseal_core::{
    digest_prefix, AuditEntrySource, AuditWriter, ChecksumCalculator, Sha256ChecksumCalculator,
    WindowSnapshot,
};

use crate::export::ChainExport;

// ── Internal mutable state ────────────────────────────────────────────────────

/// The mutable interior of an `InMemoryAuditStore`.
#[derive(Default)]
pub(crate) struct InMemoryState {
    /// All entries written so far, in append order.
    pub(crate) entries: Vec<AuditEntry>,

    /// Stored checksum per entry id.
    pub(crate) checksums: HashMap<String, String>,

    /// Checksum of the last written entry, or `None` before any write.
    pub(crate) head: Option<String>,

    /// Timestamp of the last written entry.
    pub(crate) last_timestamp: Option<DateTime<Utc>>,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory, append-only audit store backed by a SHA-256 hash chain.
///
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct InMemoryAuditStore {
    calculator: Sha256ChecksumCalculator,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ChainsealResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| ChainsealError::StoreError {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }

    /// Number of entries written so far.
    pub fn len(&self) -> ChainsealResult<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> ChainsealResult<bool> {
        Ok(self.lock()?.entries.is_empty())
    }

    /// Export every entry and stored checksum.
    pub fn export(&self) -> ChainsealResult<ChainExport> {
        let state = self.lock()?;
        let checksums: BTreeMap<String, String> = state
            .checksums
            .iter()
            .map(|(id, checksum)| (id.clone(), checksum.clone()))
            .collect();

        Ok(ChainExport {
            entries: state.entries.clone(),
            checksums,
            exported_at: Utc::now(),
            head_checksum: state.head.clone(),
        })
    }
}

// ── AuditWriter impl ──────────────────────────────────────────────────────────

impl AuditWriter for InMemoryAuditStore {
    /// Append one draft to the hash chain.
    ///
    /// Assigns a UUID v7 id, defaults the timestamp to now, links
    /// `previous_checksum` to the current head, computes the checksum, and
    /// stores both.  A draft timestamped before the current head is
    /// rejected, since date-range windows rely on append order matching
    /// timestamp order.
    fn append(&self, draft: NewAuditEntry) -> ChainsealResult<AuditEntry> {
        let mut state = self.lock()?;

        let now = Utc::now();
        let at = draft.timestamp.unwrap_or(now);
        if let Some(last) = state.last_timestamp {
            if at < last {
                return Err(ChainsealError::StoreError {
                    reason: format!("entry timestamp {at} precedes chain head timestamp {last}"),
                });
            }
        }

        let entry = draft.into_entry(new_entry_id(), now, state.head.clone());
        let checksum = self.calculator.calculate_checksum(&entry)?;

        debug!(
            entry_id = %entry.id,
            checksum = %digest_prefix(&checksum, 8),
            linked = entry.previous_checksum.is_some(),
            "audit entry appended"
        );

        state.checksums.insert(entry.id.clone(), checksum.clone());
        state.entries.push(entry.clone());
        state.head = Some(checksum);
        state.last_timestamp = Some(at);

        Ok(entry)
    }

    fn head_checksum(&self) -> ChainsealResult<Option<String>> {
        Ok(self.lock()?.head.clone())
    }
}

// ── AuditEntrySource impl ─────────────────────────────────────────────────────

impl AuditEntrySource for InMemoryAuditStore {
    /// Return the entries matching `options` with their stored checksums.
    ///
    /// For unfiltered windows the snapshot also reports whether the window
    /// starts at the chain head and, if not, the id and checksum of the entry
    /// just before it.
    fn fetch_window(&self, options: &ChainVerificationOptions) -> ChainsealResult<WindowSnapshot> {
        options.validate()?;
        let state = self.lock()?;

        let mut first_index = None;
        let mut entries = Vec::new();
        let mut stored_checksums = HashMap::new();

        for (index, entry) in state.entries.iter().enumerate() {
            if !options.matches(entry) {
                continue;
            }
            first_index.get_or_insert(index);
            if let Some(checksum) = state.checksums.get(&entry.id) {
                stored_checksums.insert(entry.id.clone(), checksum.clone());
            }
            entries.push(entry.clone());
        }

        let (starts_at_chain_head, predecessor) = match first_index {
            Some(_) if options.is_filtered() => (false, None),
            Some(0) => (true, None),
            Some(index) => {
                let previous = &state.entries[index - 1];
                let checksum = state.checksums.get(&previous.id).cloned();
                (false, checksum.map(|checksum| (previous.id.clone(), checksum)))
            }
            None => (false, None),
        };

        info!(
            entries = entries.len(),
            starts_at_chain_head,
            has_predecessor = predecessor.is_some(),
            "audit window fetched"
        );

        Ok(WindowSnapshot {
            entries,
            stored_checksums,
            predecessor,
            starts_at_chain_head,
        })
    }
}
