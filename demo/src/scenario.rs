//! Narrated tamper-detection scenario.
//!
//! Seeds an in-memory store with a short chain of account events, then
//! shows what the verifier reports for an intact chain, for an entry whose
//! content was altered, for an attacker who also rewrote the stored
//! checksum, and for a date window that starts mid-chain.

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use chainseal_audit::InMemoryAuditStore;
use chainseal_contracts::{
    entry::{ActorType, AuditEntry, NewAuditEntry},
    error::ChainsealResult,
    integrity::ChainIntegrityResult,
    options::ChainVerificationOptions,
};
use chainseal_core::{calculate_checksum, AuditWriter};
use chainseal_verify::ChainVerifier;

const ACTORS: [(&str, ActorType); 4] = [
    ("alice", ActorType::User),
    ("ops-admin", ActorType::Admin),
    ("billing-svc", ActorType::Service),
    ("scheduler", ActorType::System),
];

/// Fill a new store with `count` account events, one minute apart.
pub fn seed_store(count: usize) -> ChainsealResult<InMemoryAuditStore> {
    let store = InMemoryAuditStore::new();
    let base = Utc
        .with_ymd_and_hms(2024, 1, 15, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    for i in 0..count {
        let (actor_id, actor_type) = ACTORS[i % ACTORS.len()];
        let mut draft = NewAuditEntry::new(actor_id, actor_type, "adjust_balance", "account")
            .with_resource_id(format!("acct-{:03}", i % 5))
            .with_before_state(json!({ "balance": 100 * i, "currency": "EUR" }))
            .with_after_state(json!({ "currency": "EUR", "balance": 100 * i + 25 }))
            .at(base + Duration::minutes(i as i64));
        if actor_type == ActorType::Service {
            draft = draft.with_service("billing");
        }
        store.append(draft)?;
    }

    Ok(store)
}

/// Alter an entry's content the way an out-of-band edit would.
pub fn tamper(entry: &mut AuditEntry) {
    entry.after_state = Some(json!({ "currency": "EUR", "balance": 1_000_000 }));
}

/// Run the scenario.  Returns `true` when every step produced the expected
/// verdict.
pub fn run() -> ChainsealResult<bool> {
    print_banner();

    let store = seed_store(8)?;
    let verifier = ChainVerifier::default();
    let mut as_expected = true;

    println!("[1] Intact chain, verified from the chain head");
    let report = verifier.verify_source(&store, &ChainVerificationOptions::default())?;
    print_report(&report);
    as_expected &= report.valid;

    let export = store.export()?;
    let stored = export.stored_checksums();

    println!("[2] Entry 4 content altered in storage");
    let mut entries = export.entries.clone();
    tamper(&mut entries[4]);
    let report = verifier.verify_chain(&entries, &stored, &ChainVerificationOptions::default())?;
    print_report(&report);
    as_expected &= report.first_invalid_entry.as_ref().map(|r| r.index) == Some(4);

    println!("[3] Entry 4 altered and its stored checksum rewritten");
    let mut rewritten = stored.clone();
    rewritten.insert(entries[4].id.clone(), calculate_checksum(&entries[4])?);
    let report = verifier.verify_chain(&entries, &rewritten, &ChainVerificationOptions::default())?;
    print_report(&report);
    as_expected &= report.first_invalid_entry.as_ref().map(|r| r.index) == Some(5);

    println!("[4] Mid-chain window (minutes 3 to 6), anchored to its predecessor");
    let start = export.entries[3].timestamp.instant();
    let end = export.entries[6].timestamp.instant();
    if let (Some(start), Some(end)) = (start, end) {
        let window = ChainVerificationOptions::default().between(start, end);
        let report = verifier.verify_source(&store, &window)?;
        print_report(&report);
        as_expected &= report.valid;
    }

    if as_expected {
        println!("All scenario steps produced the expected verdicts.");
    } else {
        println!("Some scenario steps produced unexpected verdicts.");
    }
    Ok(as_expected)
}

fn print_report(report: &ChainIntegrityResult) {
    println!(
        "    valid={} checked={} invalid={} boundary={:?}",
        report.valid, report.total_entries, report.invalid_entries, report.boundary
    );
    for finding in &report.invalid_entry_details {
        println!(
            "    #{} {} -> {}",
            finding.index,
            finding.entry_id,
            finding.reason.as_deref().unwrap_or("invalid"),
        );
    }
    println!();
}

fn print_banner() {
    println!();
    println!("chainseal — Tamper-evident Audit Chain");
    println!("======================================");
    println!();
    println!("Checks per entry:");
    println!("  [1] A stored checksum exists for the entry id");
    println!("  [2] SHA-256 of the canonical entry matches the stored checksum");
    println!("  [3] previousChecksum matches the predecessor's stored checksum");
    println!();
}
