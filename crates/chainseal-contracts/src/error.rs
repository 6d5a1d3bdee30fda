//! Error types for the chainseal audit hash chain.
//!
//! Integrity findings (missing digests, checksum mismatches, chain breaks) are
//! never errors: they are reported inside a `ChainIntegrityResult`.  The
//! variants here cover caller-contract violations and malformed input only.

use thiserror::Error;

/// The unified error type for the chainseal crates.
#[derive(Debug, Error)]
pub enum ChainsealError {
    /// An entry is missing a required field.
    ///
    /// This is an upstream data-quality bug, not evidence of tampering.
    #[error("malformed audit entry '{entry_id}': required field '{field}' is empty")]
    MalformedEntry { entry_id: String, field: &'static str },

    /// An entry's timestamp text could not be parsed as an ISO-8601 instant.
    #[error("malformed audit entry '{entry_id}': unparseable timestamp '{value}'")]
    InvalidTimestamp { entry_id: String, value: String },

    /// The verification window holds more entries than the configured limit
    /// and the caller did not request an override.
    #[error("verification window of {count} entries exceeds the limit of {limit}")]
    WindowTooLarge { count: usize, limit: usize },

    /// The verification options are inconsistent or unsupported.
    #[error("invalid verification options: {reason}")]
    InvalidOptions { reason: String },

    /// Entries were not supplied in ascending timestamp order.
    #[error("entries out of order at index {index} (entry '{entry_id}')")]
    EntriesOutOfOrder { index: usize, entry_id: String },

    /// The canonical form of an entry could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The backing audit store failed to append or read entries.
    #[error("audit store error: {reason}")]
    StoreError { reason: String },
}

impl ChainsealError {
    /// True for errors caused by bad entry data rather than by the caller's
    /// use of the API.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ChainsealError::MalformedEntry { .. } | ChainsealError::InvalidTimestamp { .. }
        )
    }
}

/// Convenience alias used throughout the chainseal crates.
pub type ChainsealResult<T> = Result<T, ChainsealError>;
