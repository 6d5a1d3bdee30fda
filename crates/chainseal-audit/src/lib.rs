//! # chainseal-audit
//!
//! Append-only audit storage that links every entry into a SHA-256 hash
//! chain at write time.
//!
//! ## Overview
//!
//! Each appended entry carries the checksum of the entry before it in
//! `previous_checksum`, and its own checksum is stored beside it.  Tampering
//! with a stored entry, even a single byte, makes its recomputed checksum
//! disagree with the stored one, which `chainseal-verify` reports.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainseal_audit::InMemoryAuditStore;
//! use chainseal_core::{AuditEntrySource, AuditWriter};
//!
//! let store = InMemoryAuditStore::new();
//! store.append(NewAuditEntry::new("user-1", ActorType::User, "login", "session"))?;
//!
//! let window = store.fetch_window(&ChainVerificationOptions::default())?;
//! ```

pub mod chain;
pub mod export;
pub mod memory;

pub use chain::{checksum_map, seal_entries};
pub use export::ChainExport;
pub use memory::InMemoryAuditStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
