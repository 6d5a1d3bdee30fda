//! Verification report types.
//!
//! A verification run produces one `ChainIntegrityResult` for the whole
//! window.  Each entry that fails at least one check contributes a
//! `ChecksumVerificationResult` describing what went wrong.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single failed check on one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityFailure {
    /// No stored checksum exists for the entry's id.
    MissingStoredChecksum,
    /// The recomputed checksum differs from the stored one.
    ChecksumMismatch,
    /// The entry's `previous_checksum` does not match its predecessor.
    ChainBreak,
    /// The entry was declared the chain head but links to a predecessor.
    UnexpectedPredecessorLink,
}

impl IntegrityFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrityFailure::MissingStoredChecksum => "missing stored checksum",
            IntegrityFailure::ChecksumMismatch => "checksum mismatch",
            IntegrityFailure::ChainBreak => "chain break: link does not match predecessor",
            IntegrityFailure::UnexpectedPredecessorLink => {
                "chain head links to a predecessor checksum"
            }
        }
    }
}

/// Outcome of checking one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumVerificationResult {
    pub entry_id: String,

    /// Position of the entry in the verified window.
    pub index: usize,

    pub valid: bool,

    /// The stored checksum, or `None` when it was missing.
    pub expected_checksum: Option<String>,

    /// The checksum recomputed from the entry's content.  Empty when the
    /// entry was not recomputed (missing stored checksum).
    pub actual_checksum: String,

    /// Id of the entry whose checksum the link was checked against.
    pub previous_entry_id: Option<String>,

    /// Every check this entry failed, in evaluation order.
    pub failures: Vec<IntegrityFailure>,

    /// Human-readable failure description.  Only digest prefixes appear here.
    pub reason: Option<String>,
}

/// The date span a verification run covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// How the first entry of the window was checked against what precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCheck {
    /// No predecessor check: the run attests internal consistency only.
    Unchecked,
    /// The first entry was required to be the chain head.
    Genesis,
    /// The first entry was checked against a caller-supplied predecessor.
    Predecessor,
}

/// Outcome of verifying a window of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIntegrityResult {
    /// True iff no entry failed any check.
    pub valid: bool,

    /// Entries actually checked.  Lower than the window size only when the
    /// run stopped early.
    pub total_entries: usize,

    pub valid_entries: usize,

    /// Count of every invalid entry, including those beyond the detail cap.
    pub invalid_entries: usize,

    /// The lowest-index invalid entry, for fast triage.
    ///
    /// Present whenever `invalid_entries > 0`, even when the detail list is
    /// capped. A parallel early-exit run reports the same entry as a
    /// sequential one.
    pub first_invalid_entry: Option<ChecksumVerificationResult>,

    /// Invalid entries in ascending index order, capped.
    pub invalid_entry_details: Vec<ChecksumVerificationResult>,

    pub verified_at: DateTime<Utc>,

    pub date_range: DateRange,

    /// True when `stop_on_first_invalid` left entries unchecked.
    pub stopped_early: bool,

    /// False when predecessor links were not checked (filtered windows).
    pub links_checked: bool,

    pub boundary: BoundaryCheck,
}
