//! Canonical encoding of an audit entry.
//!
//! The canonical form is compact JSON with a fixed field order:
//!
//!   id, timestamp, actorId, actorType, [serviceId], action, resourceType,
//!   [resourceId], [beforeState], [afterState], [previousChecksum]
//!
//! Bracketed fields are omitted entirely when absent.  The timestamp is
//! rendered as UTC ISO-8601 with millisecond precision.  Object keys inside
//! `beforeState`/`afterState` are sorted at every nesting level; array order
//! is preserved.
//!
//! Changing anything in this module changes every digest ever produced, so
//! previously stored chains would stop verifying.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::error;

use chainseal_contracts::{
    entry::{ActorType, AuditEntry},
    error::{ChainsealError, ChainsealResult},
};

/// Render an instant in the canonical timestamp form, e.g.
/// `2024-03-01T12:00:00.000Z`.
pub fn canonical_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serializes a JSON value with object keys in sorted order at every depth.
///
/// Sorting happens at serialization time, so the result does not depend on
/// whether `serde_json` was built with `preserve_order`.
pub struct SortedKeys<'a>(pub &'a Value);

impl Serialize for SortedKeys<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort_unstable();
                let mut out = serializer.serialize_map(Some(keys.len()))?;
                for key in keys {
                    out.serialize_entry(key, &SortedKeys(&map[key.as_str()]))?;
                }
                out.end()
            }
            Value::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(&SortedKeys(item))?;
                }
                out.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

/// The hash input for one entry.  Field declaration order is the canonical
/// order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEntry<'a> {
    id: &'a str,
    timestamp: String,
    actor_id: &'a str,
    actor_type: ActorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_id: Option<&'a str>,
    action: &'a str,
    resource_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before_state: Option<SortedKeys<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after_state: Option<SortedKeys<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_checksum: Option<&'a str>,
}

impl<'a> CanonicalEntry<'a> {
    /// Build the canonical view of `entry`.
    ///
    /// Fails with `MalformedEntry` or `InvalidTimestamp` when a required
    /// field is empty or the timestamp cannot be resolved.
    pub fn from_entry(entry: &'a AuditEntry) -> ChainsealResult<Self> {
        let at = entry.validate().inspect_err(|e| {
            error!(entry_id = %entry.id, error = %e, "malformed entry");
        })?;

        Ok(Self {
            id: &entry.id,
            timestamp: canonical_timestamp(&at),
            actor_id: &entry.actor_id,
            actor_type: entry.actor_type,
            service_id: entry.service_id.as_deref(),
            action: &entry.action,
            resource_type: &entry.resource_type,
            resource_id: entry.resource_id.as_deref(),
            before_state: entry.before_state.as_ref().map(SortedKeys),
            after_state: entry.after_state.as_ref().map(SortedKeys),
            previous_checksum: entry.previous_checksum.as_deref(),
        })
    }

    /// Compact JSON bytes fed to the hash function.
    pub fn to_bytes(&self) -> ChainsealResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ChainsealError::Serialization {
            reason: format!("failed to encode canonical entry '{}': {}", self.id, e),
        })
    }
}

/// The canonical form of `entry` as a string.  Useful for diagnostics; the
/// checksum is computed over exactly these bytes.
pub fn canonical_json(entry: &AuditEntry) -> ChainsealResult<String> {
    let bytes = CanonicalEntry::from_entry(entry)?.to_bytes()?;
    String::from_utf8(bytes).map_err(|e| ChainsealError::Serialization {
        reason: format!("canonical entry is not UTF-8: {e}"),
    })
}
