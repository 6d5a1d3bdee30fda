//! Verifier configuration schema and loader.
//!
//! A `VerifierConfig` is deserialized from TOML.  Every key is optional and
//! falls back to the default listed on its field.
//!
//! Example:
//! ```toml
//! max_entries = 50000
//! max_reported_invalid = 100
//! digest_prefix_len = 8
//! workers = 4
//! parallel_threshold = 2048
//! assert_sorted = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use chainseal_contracts::{
    error::{ChainsealError, ChainsealResult},
    options::DEFAULT_MAX_ENTRIES,
};

/// Tuning knobs for `ChainVerifier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Window size limit applied when the options carry no explicit `limit`.
    /// Default: 10 000.
    pub max_entries: usize,

    /// Cap on `invalid_entry_details` in a report.  Default: 100.
    pub max_reported_invalid: usize,

    /// Hex characters of a digest shown in failure reasons and logs.
    /// Default: 8.
    pub digest_prefix_len: usize,

    /// Worker threads for one verification run.  `1` keeps the walk
    /// sequential.  Default: 1.
    pub workers: usize,

    /// Smallest window that is split across workers.  Default: 1 024.
    pub parallel_threshold: usize,

    /// Fail with `EntriesOutOfOrder` when timestamps decrease.  Default: false.
    pub assert_sorted: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_reported_invalid: 100,
            digest_prefix_len: 8,
            workers: 1,
            parallel_threshold: 1024,
            assert_sorted: false,
        }
    }
}

impl VerifierConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `ChainsealError::ConfigError` if the TOML is malformed, has
    /// unknown keys, or holds out-of-range values.
    pub fn from_toml_str(s: &str) -> ChainsealResult<Self> {
        let config: VerifierConfig = toml::from_str(s).map_err(|e| ChainsealError::ConfigError {
            reason: format!("failed to parse verifier TOML: {}", e),
        })?;
        config.validate()?;
        debug!(?config, "verifier configuration loaded");
        Ok(config)
    }

    /// Read the file at `path` and parse it as verifier configuration.
    pub fn from_file(path: &Path) -> ChainsealResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ChainsealError::ConfigError {
            reason: format!("failed to read verifier config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values that would make verification meaningless.
    pub fn validate(&self) -> ChainsealResult<()> {
        let positive = [
            ("max_entries", self.max_entries),
            ("max_reported_invalid", self.max_reported_invalid),
            ("digest_prefix_len", self.digest_prefix_len),
            ("workers", self.workers),
            ("parallel_threshold", self.parallel_threshold),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ChainsealError::ConfigError {
                    reason: format!("'{key}' must be greater than zero"),
                });
            }
        }

        // Reasons must never carry a full 64-character digest.
        if self.digest_prefix_len >= 64 {
            return Err(ChainsealError::ConfigError {
                reason: format!(
                    "'digest_prefix_len' must be below 64, got {}",
                    self.digest_prefix_len
                ),
            });
        }

        Ok(())
    }
}
