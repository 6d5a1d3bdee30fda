//! Hash-chain verifier for stored audit windows.
//!
//! `ChainVerifier` walks a window of entries in the order supplied and runs
//! up to three checks per entry:
//!
//! 1. **Presence**: a stored checksum exists for the entry id.  If not, the
//!    entry is reported as "missing stored checksum" and no further checks
//!    run for it.
//! 2. **Content**: the recomputed checksum equals the stored one (constant
//!    time comparison).
//! 3. **Link**: `previous_checksum` equals the *stored* checksum of the
//!    preceding entry.  Using the stored value rather than a recomputation
//!    keeps a tampered entry from cascading failures onto its successors.
//!    The first entry is checked according to the window's `WindowAnchor`.
//!
//! Integrity findings are collected into a `ChainIntegrityResult`; only
//! caller-contract violations and malformed entries are returned as errors.
//!
//! Large windows may be split into contiguous index ranges checked by scoped
//! worker threads.  Results are merged in index order, so the report is the
//! same as a sequential walk.  With `stop_on_first_invalid`, workers share the
//! lowest invalid index found so far and keep walking any entry below it, so
//! the reported first invalid entry is the one a sequential walk would stop
//! at.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use chrono::Utc;
use tracing::{debug, info, warn};

use chainseal_config::VerifierConfig;
use chainseal_contracts::{
    entry::AuditEntry,
    error::{ChainsealError, ChainsealResult},
    integrity::{
        BoundaryCheck, ChainIntegrityResult, ChecksumVerificationResult, DateRange,
        IntegrityFailure,
    },
    options::{ChainVerificationOptions, WindowAnchor},
};
use chainseal_core::{
    digest_prefix, secure_compare, AuditEntrySource, ChecksumCalculator, Sha256ChecksumCalculator,
};

/// Read-only inputs shared by every worker of one run.
struct WalkContext<'a> {
    entries: &'a [AuditEntry],
    stored: &'a HashMap<String, String>,
    anchor: &'a WindowAnchor,
    links_checked: bool,
    stop_on_first_invalid: bool,
}

/// What one walk over an index range found.
#[derive(Default)]
struct WalkOutcome {
    checked: usize,
    valid: usize,
    invalid: usize,
    /// Invalid results in ascending index order, at most the detail cap.
    details: Vec<ChecksumVerificationResult>,
    /// Lowest-index invalid result, kept even when the detail cap is hit.
    first_invalid: Option<ChecksumVerificationResult>,
}

impl WalkOutcome {
    fn record_invalid(&mut self, result: ChecksumVerificationResult, cap: usize) {
        self.invalid += 1;
        if self.first_invalid.is_none() {
            self.first_invalid = Some(result.clone());
        }
        if self.details.len() < cap {
            self.details.push(result);
        }
    }
}

/// The audit hash-chain verifier.
///
/// Stateless apart from its configuration; build one at the composition
/// root and share it, or build one per call.
#[derive(Debug, Clone)]
pub struct ChainVerifier<C = Sha256ChecksumCalculator> {
    calculator: C,
    config: VerifierConfig,
}

impl ChainVerifier {
    /// A verifier using SHA-256 checksums and the given configuration.
    ///
    /// # Errors
    ///
    /// `ConfigError` when the configuration fails `VerifierConfig::validate`.
    pub fn new(config: VerifierConfig) -> ChainsealResult<Self> {
        Self::with_calculator(Sha256ChecksumCalculator, config)
    }
}

impl Default for ChainVerifier {
    fn default() -> Self {
        Self {
            calculator: Sha256ChecksumCalculator,
            config: VerifierConfig::default(),
        }
    }
}

impl<C: ChecksumCalculator> ChainVerifier<C> {
    /// A verifier using a caller-supplied checksum calculator.
    ///
    /// # Errors
    ///
    /// `ConfigError` when the configuration fails `VerifierConfig::validate`,
    /// e.g. a zero detail cap or a digest prefix long enough to reveal whole
    /// digests in failure reasons.
    pub fn with_calculator(calculator: C, config: VerifierConfig) -> ChainsealResult<Self> {
        config.validate().inspect_err(|e| {
            warn!(error = %e, "rejected verifier configuration");
        })?;
        Ok(Self { calculator, config })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `entries` (ascending chronological order) against
    /// `stored_checksums`.
    ///
    /// # Errors
    ///
    /// - `InvalidOptions` for inconsistent options.
    /// - `WindowTooLarge` when the window exceeds the limit and
    ///   `allow_oversized` is not set.
    /// - `EntriesOutOfOrder` when `assert_sorted` is configured and
    ///   timestamps decrease.
    /// - `MalformedEntry` / `InvalidTimestamp` for entries missing required
    ///   data.
    ///
    /// Missing checksums, checksum mismatches, and chain breaks are never
    /// errors; they are reported in the returned result.
    pub fn verify_chain(
        &self,
        entries: &[AuditEntry],
        stored_checksums: &HashMap<String, String>,
        options: &ChainVerificationOptions,
    ) -> ChainsealResult<ChainIntegrityResult> {
        options.validate()?;

        let limit = options.limit.unwrap_or(self.config.max_entries);
        if entries.len() > limit && !options.allow_oversized {
            return Err(ChainsealError::WindowTooLarge {
                count: entries.len(),
                limit,
            });
        }

        if self.config.assert_sorted {
            assert_ascending(entries)?;
        }

        let ctx = WalkContext {
            entries,
            stored: stored_checksums,
            anchor: &options.anchor,
            links_checked: !options.is_filtered(),
            stop_on_first_invalid: options.stop_on_first_invalid,
        };

        let workers = self.config.workers.min(entries.len().max(1));
        let outcome = if workers > 1 && entries.len() >= self.config.parallel_threshold {
            debug!(workers, entries = entries.len(), "verifying window in parallel");
            self.walk_parallel(&ctx, workers)?
        } else {
            let stop = AtomicUsize::new(usize::MAX);
            self.walk_range(&ctx, 0..entries.len(), &stop)?
        };

        let result = ChainIntegrityResult {
            valid: outcome.invalid == 0,
            total_entries: outcome.checked,
            valid_entries: outcome.valid,
            invalid_entries: outcome.invalid,
            first_invalid_entry: outcome.first_invalid,
            invalid_entry_details: outcome.details,
            verified_at: Utc::now(),
            date_range: date_range(entries, options),
            stopped_early: outcome.checked < entries.len(),
            links_checked: ctx.links_checked,
            boundary: boundary_check(&ctx),
        };

        info!(
            valid = result.valid,
            total = result.total_entries,
            invalid = result.invalid_entries,
            stopped_early = result.stopped_early,
            boundary = ?result.boundary,
            "audit chain verified"
        );

        Ok(result)
    }

    /// Fetch a window from `source` and verify it.
    ///
    /// When the caller left the anchor `Unanchored`, the anchor reported by
    /// the snapshot is used, so a window fetched from the chain head or with
    /// a known predecessor gets its boundary checked.
    pub fn verify_source<S>(
        &self,
        source: &S,
        options: &ChainVerificationOptions,
    ) -> ChainsealResult<ChainIntegrityResult>
    where
        S: AuditEntrySource + ?Sized,
    {
        let snapshot = source.fetch_window(options)?;

        let mut effective = options.clone();
        if effective.anchor == WindowAnchor::Unanchored && !effective.is_filtered() {
            effective.anchor = snapshot.anchor();
        }

        self.verify_chain(&snapshot.entries, &snapshot.stored_checksums, &effective)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Split the window into contiguous chunks, one per worker, and merge
    /// the outcomes in index order.
    fn walk_parallel(&self, ctx: &WalkContext<'_>, workers: usize) -> ChainsealResult<WalkOutcome> {
        let len = ctx.entries.len();
        let chunk_size = len.div_ceil(workers);
        let stop = AtomicUsize::new(usize::MAX);

        let chunks: Vec<ChainsealResult<WalkOutcome>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..len)
                .step_by(chunk_size)
                .map(|start| {
                    let range = start..(start + chunk_size).min(len);
                    let stop = &stop;
                    scope.spawn(move || self.walk_range(ctx, range, stop))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });

        let mut merged = WalkOutcome::default();
        for chunk in chunks {
            let chunk = chunk?;
            merged.checked += chunk.checked;
            merged.valid += chunk.valid;
            merged.invalid += chunk.invalid;
            if merged.first_invalid.is_none() {
                merged.first_invalid = chunk.first_invalid;
            }
            let room = self.config.max_reported_invalid - merged.details.len();
            merged.details.extend(chunk.details.into_iter().take(room));
        }
        Ok(merged)
    }

    /// Check every entry in `range`.
    ///
    /// `stop` holds the lowest invalid index any worker has found.  With
    /// `stop_on_first_invalid`, a worker only gives up on entries above it,
    /// so a lower range still walks up to its own first invalid entry.
    fn walk_range(
        &self,
        ctx: &WalkContext<'_>,
        range: Range<usize>,
        stop: &AtomicUsize,
    ) -> ChainsealResult<WalkOutcome> {
        let mut outcome = WalkOutcome::default();

        for index in range {
            if ctx.stop_on_first_invalid && index > stop.load(Ordering::Relaxed) {
                break;
            }

            let result = self.check_entry(ctx, index)?;
            outcome.checked += 1;

            if result.valid {
                outcome.valid += 1;
                continue;
            }

            outcome.record_invalid(result, self.config.max_reported_invalid);
            if ctx.stop_on_first_invalid {
                stop.fetch_min(index, Ordering::Relaxed);
                break;
            }
        }

        Ok(outcome)
    }

    /// Run the presence, content, and link checks for one entry.
    fn check_entry(
        &self,
        ctx: &WalkContext<'_>,
        index: usize,
    ) -> ChainsealResult<ChecksumVerificationResult> {
        let entry = &ctx.entries[index];
        let prefix_len = self.config.digest_prefix_len;

        let Some(expected) = ctx.stored.get(&entry.id) else {
            let failure = IntegrityFailure::MissingStoredChecksum;
            warn!(entry_id = %entry.id, index, "integrity finding: {}", failure.as_str());
            return Ok(ChecksumVerificationResult {
                entry_id: entry.id.clone(),
                index,
                valid: false,
                expected_checksum: None,
                actual_checksum: String::new(),
                previous_entry_id: None,
                failures: vec![failure],
                reason: Some(failure.as_str().to_string()),
            });
        };

        let actual = self.calculator.calculate_checksum(entry)?;
        let mut failures = Vec::new();
        let mut reasons = Vec::new();

        if !secure_compare(&actual, expected) {
            failures.push(IntegrityFailure::ChecksumMismatch);
            reasons.push(format!(
                "{}: stored {} but computed {}",
                IntegrityFailure::ChecksumMismatch.as_str(),
                digest_prefix(expected, prefix_len),
                digest_prefix(&actual, prefix_len),
            ));
        }

        let mut previous_entry_id = None;
        if ctx.links_checked {
            let link = entry.previous_checksum.as_deref();
            match index.checked_sub(1).map(|p| &ctx.entries[p]) {
                Some(previous) => {
                    previous_entry_id = Some(previous.id.clone());
                    // A predecessor without a stored checksum is already
                    // reported on its own; its successor's link is unknowable.
                    if let Some(previous_checksum) = ctx.stored.get(&previous.id) {
                        if !link_matches(link, previous_checksum) {
                            failures.push(IntegrityFailure::ChainBreak);
                            reasons.push(link_reason(link, previous_checksum, prefix_len));
                        }
                    }
                }
                None => match ctx.anchor {
                    WindowAnchor::Unanchored => {}
                    WindowAnchor::Genesis => {
                        if let Some(link) = link {
                            failures.push(IntegrityFailure::UnexpectedPredecessorLink);
                            reasons.push(format!(
                                "{}: found {}",
                                IntegrityFailure::UnexpectedPredecessorLink.as_str(),
                                digest_prefix(link, prefix_len),
                            ));
                        }
                    }
                    WindowAnchor::Predecessor { entry_id, checksum } => {
                        previous_entry_id = Some(entry_id.clone());
                        if !link_matches(link, checksum) {
                            failures.push(IntegrityFailure::ChainBreak);
                            reasons.push(link_reason(link, checksum, prefix_len));
                        }
                    }
                },
            }
        }

        let valid = failures.is_empty();
        let reason = (!valid).then(|| reasons.join("; "));
        if let Some(reason) = &reason {
            warn!(entry_id = %entry.id, index, %reason, "integrity finding");
        } else {
            debug!(entry_id = %entry.id, index, "entry verified");
        }

        Ok(ChecksumVerificationResult {
            entry_id: entry.id.clone(),
            index,
            valid,
            expected_checksum: Some(expected.clone()),
            actual_checksum: actual,
            previous_entry_id,
            failures,
            reason,
        })
    }
}

fn link_matches(link: Option<&str>, previous_checksum: &str) -> bool {
    link.is_some_and(|link| secure_compare(link, previous_checksum))
}

fn link_reason(link: Option<&str>, previous_checksum: &str, prefix_len: usize) -> String {
    format!(
        "{} (expected {}, found {})",
        IntegrityFailure::ChainBreak.as_str(),
        digest_prefix(previous_checksum, prefix_len),
        link.map_or("none", |link| digest_prefix(link, prefix_len)),
    )
}

/// Fail fast if any entry's timestamp is earlier than its predecessor's.
fn assert_ascending(entries: &[AuditEntry]) -> ChainsealResult<()> {
    let mut last = None;
    for (index, entry) in entries.iter().enumerate() {
        let at = entry.validate()?;
        if last.is_some_and(|last| at < last) {
            return Err(ChainsealError::EntriesOutOfOrder {
                index,
                entry_id: entry.id.clone(),
            });
        }
        last = Some(at);
    }
    Ok(())
}

/// The requested bounds, falling back to the first and last entry times.
fn date_range(entries: &[AuditEntry], options: &ChainVerificationOptions) -> DateRange {
    DateRange {
        start: options
            .start_date
            .or_else(|| entries.first().and_then(|e| e.timestamp.instant())),
        end: options
            .end_date
            .or_else(|| entries.last().and_then(|e| e.timestamp.instant())),
    }
}

fn boundary_check(ctx: &WalkContext<'_>) -> BoundaryCheck {
    if !ctx.links_checked {
        return BoundaryCheck::Unchecked;
    }
    match ctx.anchor {
        WindowAnchor::Unanchored => BoundaryCheck::Unchecked,
        WindowAnchor::Genesis => BoundaryCheck::Genesis,
        WindowAnchor::Predecessor { .. } => BoundaryCheck::Predecessor,
    }
}
