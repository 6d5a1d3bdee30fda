//! chainseal — Audit Hash-Chain Demo CLI
//!
//! Builds, checksums, and verifies tamper-evident audit chains stored as
//! JSON.  Every subcommand uses the real writer, calculator, and verifier.
//!
//! Usage:
//!   cargo run -p demo -- run
//!   cargo run -p demo -- seed --count 20 --out chain.json --tamper 7
//!   cargo run -p demo -- checksum --entry entry.json
//!   cargo run -p demo -- verify --input chain.json --stop-on-first-invalid

mod scenario;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chainseal_audit::ChainExport;
use chainseal_config::VerifierConfig;
use chainseal_contracts::{
    entry::AuditEntry,
    error::{ChainsealError, ChainsealResult},
    options::{ChainVerificationOptions, WindowAnchor},
};
use chainseal_core::calculate_checksum;
use chainseal_verify::ChainVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// chainseal — tamper-evident audit hash chains.
#[derive(Parser)]
#[command(
    name = "chainseal-demo",
    about = "chainseal audit hash-chain demo",
    long_about = "Seeds, checksums, and verifies SHA-256 linked audit chains,\n\
                  reporting missing checksums, content tampering, and chain breaks."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed, tamper, and verify a chain in memory, narrating each step.
    Run,
    /// Write a freshly sealed demo chain to a JSON file.
    Seed {
        /// Number of entries to write.
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Output file.
        #[arg(long)]
        out: PathBuf,
        /// Alter the content of the entry at this index after sealing.
        #[arg(long)]
        tamper: Option<usize>,
    },
    /// Print the checksum of a single entry read from a JSON file.
    Checksum {
        #[arg(long)]
        entry: PathBuf,
    },
    /// Verify a chain file produced by `seed` (or any export of that shape).
    Verify {
        #[arg(long)]
        input: PathBuf,
        /// Verifier configuration in TOML.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        stop_on_first_invalid: bool,
        /// Override the maximum window size.
        #[arg(long)]
        limit: Option<usize>,
        /// Treat the first entry as the chain head.
        #[arg(long)]
        genesis: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run => scenario::run(),
        Command::Seed { count, out, tamper } => seed(count, &out, tamper),
        Command::Checksum { entry } => checksum(&entry),
        Command::Verify {
            input,
            config,
            stop_on_first_invalid,
            limit,
            genesis,
        } => verify(&input, config.as_deref(), stop_on_first_invalid, limit, genesis),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            if e.is_malformed_input() {
                eprintln!("Malformed input: {}", e);
            } else {
                eprintln!("Error: {}", e);
            }
            std::process::exit(1);
        }
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn seed(count: usize, out: &Path, tamper: Option<usize>) -> ChainsealResult<bool> {
    let mut export = scenario::seed_store(count)?.export()?;

    if let Some(index) = tamper {
        let entry = export
            .entries
            .get_mut(index)
            .ok_or_else(|| ChainsealError::InvalidOptions {
                reason: format!("--tamper {index} is outside a chain of {count} entries"),
            })?;
        scenario::tamper(entry);
        info!(index, entry_id = %entry.id, "entry content altered after sealing");
    }

    let json = serde_json::to_string_pretty(&export).map_err(|e| ChainsealError::Serialization {
        reason: format!("failed to encode chain export: {e}"),
    })?;
    write_file(out, &json)?;

    println!(
        "Wrote {} entries to {} (head {})",
        export.entries.len(),
        out.display(),
        export.head_checksum.as_deref().unwrap_or("none"),
    );
    Ok(true)
}

fn checksum(path: &Path) -> ChainsealResult<bool> {
    let entry: AuditEntry = read_json(path)?;
    println!("{}", calculate_checksum(&entry)?);
    Ok(true)
}

fn verify(
    input: &Path,
    config: Option<&Path>,
    stop_on_first_invalid: bool,
    limit: Option<usize>,
    genesis: bool,
) -> ChainsealResult<bool> {
    let config = match config {
        Some(path) => VerifierConfig::from_file(path)?,
        None => VerifierConfig::default(),
    };
    let export: ChainExport = read_json(input)?;

    let mut options = ChainVerificationOptions::default();
    options.stop_on_first_invalid = stop_on_first_invalid;
    options.limit = limit;
    if genesis {
        options.anchor = WindowAnchor::Genesis;
    }

    let verifier = ChainVerifier::new(config)?;
    let report = verifier.verify_chain(&export.entries, &export.stored_checksums(), &options)?;

    let json = serde_json::to_string_pretty(&report).map_err(|e| ChainsealError::Serialization {
        reason: format!("failed to encode verification report: {e}"),
    })?;
    println!("{json}");
    Ok(report.valid)
}

// ── File helpers ──────────────────────────────────────────────────────────────

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ChainsealResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| ChainsealError::StoreError {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| ChainsealError::Serialization {
        reason: format!("failed to parse '{}': {}", path.display(), e),
    })
}

fn write_file(path: &Path, contents: &str) -> ChainsealResult<()> {
    std::fs::write(path, contents).map_err(|e| ChainsealError::StoreError {
        reason: format!("failed to write '{}': {}", path.display(), e),
    })
}
