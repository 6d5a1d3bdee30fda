//! # chainseal-contracts
//!
//! Shared types, reports, and error contracts for the chainseal audit hash
//! chain.
//!
//! Every crate in the workspace imports from here.  No hashing or chain
//! logic lives in this crate, only data definitions, validation helpers, and
//! the error type.

pub mod entry;
pub mod error;
pub mod integrity;
pub mod options;

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use entry::{new_entry_id, ActorType, AuditEntry, EntryTimestamp, NewAuditEntry};
    use error::ChainsealError;
    use options::{ChainVerificationOptions, WindowAnchor};

    fn entry() -> AuditEntry {
        NewAuditEntry::new("user-1", ActorType::User, "update", "document")
            .with_resource_id("doc-9")
            .into_entry(
                "0190a5e4-0000-7000-8000-000000000001".to_string(),
                Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                None,
            )
    }

    // ── EntryTimestamp ───────────────────────────────────────────────────────

    #[test]
    fn timestamp_text_with_offset_resolves_to_utc() {
        let ts = EntryTimestamp::from("2024-03-01T14:00:00+02:00");
        assert_eq!(
            ts.instant(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn timestamp_text_without_offset_is_utc() {
        let ts = EntryTimestamp::from("2024-03-01T12:00:00.250");
        let at = ts.instant().unwrap();
        assert_eq!(at.timestamp_millis() % 1000, 250);
        assert_eq!(
            EntryTimestamp::from("2024-03-01T12:00:00").instant(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn timestamp_garbage_does_not_resolve() {
        assert_eq!(EntryTimestamp::from("yesterday").instant(), None);
    }

    #[test]
    fn timestamp_deserializes_from_json_string() {
        let ts: EntryTimestamp = serde_json::from_str("\"2024-03-01T12:00:00Z\"").unwrap();
        assert_eq!(
            ts.instant(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
    }

    // ── AuditEntry ───────────────────────────────────────────────────────────

    #[test]
    fn entry_serializes_camel_case_and_omits_absent_fields() {
        let value = serde_json::to_value(entry()).unwrap();
        assert_eq!(value["actorId"], json!("user-1"));
        assert_eq!(value["actorType"], json!("user"));
        assert_eq!(value["resourceId"], json!("doc-9"));
        assert!(value.get("serviceId").is_none());
        assert!(value.get("previousChecksum").is_none());
    }

    #[test]
    fn entry_validate_accepts_complete_entry() {
        let at = entry().validate().unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn entry_validate_rejects_empty_required_field() {
        let mut bad = entry();
        bad.action = String::new();
        match bad.validate() {
            Err(ChainsealError::MalformedEntry { field, .. }) => assert_eq!(field, "action"),
            other => panic!("expected MalformedEntry, got {:?}", other),
        }
    }

    #[test]
    fn entry_validate_rejects_unparseable_timestamp() {
        let mut bad = entry();
        bad.timestamp = EntryTimestamp::from("not-a-date");
        let err = bad.validate().unwrap_err();
        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn new_entry_ids_are_unique_and_sortable() {
        let ids: Vec<String> = (0..50).map(|_| new_entry_id()).collect();
        let unique: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 50);

        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(sorted, ids, "v7 ids generated in sequence must sort in order");
    }

    // ── ChainVerificationOptions ─────────────────────────────────────────────

    #[test]
    fn options_reject_end_before_start() {
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let err = ChainVerificationOptions::default()
            .between(start, end)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("before start date"));
    }

    #[test]
    fn options_reject_zero_limit() {
        let err = ChainVerificationOptions::default()
            .with_limit(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ChainsealError::InvalidOptions { .. }));
    }

    #[test]
    fn options_reject_anchored_filtered_window() {
        let err = ChainVerificationOptions::default()
            .for_actor("user-1")
            .anchored(WindowAnchor::Genesis)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("cannot be anchored"));
    }

    #[test]
    fn options_match_filters_and_dates() {
        let e = entry();
        let day_start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let day_end = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();

        assert!(ChainVerificationOptions::default().matches(&e));
        assert!(ChainVerificationOptions::default()
            .between(day_start, day_end)
            .for_actor("user-1")
            .matches(&e));
        assert!(!ChainVerificationOptions::default()
            .for_actor("user-2")
            .matches(&e));
        assert!(!ChainVerificationOptions::default()
            .for_service("billing")
            .matches(&e));
        assert!(!ChainVerificationOptions::default()
            .between(day_end, day_end)
            .matches(&e));
    }

    #[test]
    fn anchor_serializes_with_kind_tag() {
        let anchor = WindowAnchor::Predecessor {
            entry_id: "e-1".to_string(),
            checksum: "ab".repeat(32),
        };
        let value = serde_json::to_value(&anchor).unwrap();
        assert_eq!(value["kind"], json!("predecessor"));
        let decoded: WindowAnchor = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, anchor);
    }

    // ── ChainsealError display messages ──────────────────────────────────────

    #[test]
    fn error_window_too_large_display() {
        let err = ChainsealError::WindowTooLarge {
            count: 12_000,
            limit: 10_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("12000"));
        assert!(msg.contains("10000"));
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn error_out_of_order_display() {
        let err = ChainsealError::EntriesOutOfOrder {
            index: 4,
            entry_id: "e-4".to_string(),
        };
        assert!(err.to_string().contains("index 4"));
    }
}
