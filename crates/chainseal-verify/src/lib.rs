//! # chainseal-verify
//!
//! Integrity verification for stored audit hash chains.
//!
//! This crate provides [`engine::ChainVerifier`], which checks a window of
//! audit entries against their stored checksums and predecessor links and
//! returns a [`ChainIntegrityResult`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use chainseal_verify::ChainVerifier;
//! use chainseal_config::VerifierConfig;
//!
//! let verifier = ChainVerifier::new(VerifierConfig::default())?;
//! let report = verifier.verify_chain(&entries, &stored, &ChainVerificationOptions::default())?;
//! if !report.valid {
//!     eprintln!("first break: {:?}", report.first_invalid_entry);
//! }
//! ```

use std::collections::HashMap;

use chainseal_contracts::{
    entry::AuditEntry, error::ChainsealResult, integrity::ChainIntegrityResult,
    options::ChainVerificationOptions,
};

pub mod engine;

pub use engine::ChainVerifier;

/// Verify `entries` with a default-configured SHA-256 verifier.
pub fn verify_chain(
    entries: &[AuditEntry],
    stored_checksums: &HashMap<String, String>,
    options: &ChainVerificationOptions,
) -> ChainsealResult<ChainIntegrityResult> {
    ChainVerifier::default().verify_chain(entries, stored_checksums, options)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
