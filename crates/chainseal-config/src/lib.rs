//! # chainseal-config
//!
//! TOML-driven configuration for the chainseal chain verifier.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use chainseal_config::VerifierConfig;
//!
//! let config = VerifierConfig::from_file(Path::new("verifier.toml"))?;
//! // Pass `config` to `chainseal_verify::ChainVerifier::new(...)`.
//! ```

pub mod config;

pub use config::VerifierConfig;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chainseal_contracts::error::ChainsealError;

    use crate::VerifierConfig;

    /// An empty document yields the defaults.
    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = VerifierConfig::from_toml_str("").unwrap();
        assert_eq!(config, VerifierConfig::default());
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.max_reported_invalid, 100);
        assert_eq!(config.workers, 1);
        assert!(!config.assert_sorted);
    }

    #[test]
    fn test_partial_override() {
        let toml = r#"
            max_entries = 50000
            workers = 4
            assert_sorted = true
        "#;

        let config = VerifierConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.max_entries, 50_000);
        assert_eq!(config.workers, 4);
        assert!(config.assert_sorted);
        assert_eq!(config.digest_prefix_len, 8);
    }

    #[test]
    fn test_zero_workers_rejected() {
        match VerifierConfig::from_toml_str("workers = 0") {
            Err(ChainsealError::ConfigError { reason }) => {
                assert!(reason.contains("workers"), "unexpected reason: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_full_digest_prefix_rejected() {
        let err = VerifierConfig::from_toml_str("digest_prefix_len = 64").unwrap_err();
        assert!(err.to_string().contains("digest_prefix_len"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = VerifierConfig::from_toml_str("max_entires = 5").unwrap_err();
        assert!(err.to_string().contains("failed to parse verifier TOML"));
    }

    /// Malformed TOML must produce a `ChainsealError::ConfigError`.
    #[test]
    fn test_toml_parse_error() {
        let result = VerifierConfig::from_toml_str("this is not valid toml ][[[");
        match result {
            Err(ChainsealError::ConfigError { reason }) => {
                assert!(
                    reason.contains("failed to parse verifier TOML"),
                    "expected parse error message, got: {reason}"
                );
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = VerifierConfig::from_file(std::path::Path::new("/nonexistent/verifier.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read verifier config"));
    }
}
