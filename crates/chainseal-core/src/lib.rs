//! # chainseal-core
//!
//! Canonicalization, SHA-256 checksums, and the seam traits of the chainseal
//! audit hash chain.
//!
//! This crate provides:
//! - `ChecksumCalculator`, `AuditWriter`, and `AuditEntrySource` traits
//! - `Sha256ChecksumCalculator`, the production calculator
//! - `secure_compare`, the constant-time digest comparison
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainseal_core::{calculate_checksum, verify_checksum};
//!
//! let digest = calculate_checksum(&entry)?;
//! assert!(verify_checksum(&entry, &digest)?);
//! ```

pub mod canonical;
pub mod checksum;
pub mod compare;
pub mod traits;

pub use canonical::{canonical_json, canonical_timestamp};
pub use checksum::{
    calculate_checksum, digest_prefix, verify_checksum, Sha256ChecksumCalculator,
    CHECKSUM_HEX_LEN,
};
pub use compare::secure_compare;
pub use traits::{AuditEntrySource, AuditWriter, ChecksumCalculator, WindowSnapshot};

// ── Tests ─────────────────────────────────────────────────────────────────────
