//! Audit entry types.
//!
//! `AuditEntry` is the immutable record protected by the hash chain.  It is
//! created once by the ingestion path and consumed read-only afterwards.
//! `NewAuditEntry` is the draft an `AuditWriter` turns into an `AuditEntry`
//! by stamping an id and linking it to the previous entry's checksum.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ChainsealError, ChainsealResult};

/// The capacity in which an actor performed an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    User,
    Admin,
    Service,
    System,
}

impl ActorType {
    /// The lowercase wire name, as it appears in the canonical form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::User => "user",
            ActorType::Admin => "admin",
            ActorType::Service => "service",
            ActorType::System => "system",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event time as supplied by the caller.
///
/// Stores either a native instant or the ISO-8601 text it arrived as.  Both
/// forms of the same instant canonicalize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryTimestamp {
    Instant(DateTime<Utc>),
    Text(String),
}

impl EntryTimestamp {
    /// Resolve to a UTC instant.
    ///
    /// Text is accepted as RFC 3339 (any offset), as an offset-less
    /// date-time (read as UTC), or as a bare date (midnight UTC).  Returns
    /// `None` for anything else.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            EntryTimestamp::Instant(at) => Some(*at),
            EntryTimestamp::Text(text) => parse_iso8601(text),
        }
    }
}

impl From<DateTime<Utc>> for EntryTimestamp {
    fn from(at: DateTime<Utc>) -> Self {
        EntryTimestamp::Instant(at)
    }
}

impl From<&str> for EntryTimestamp {
    fn from(text: &str) -> Self {
        EntryTimestamp::Text(text.to_string())
    }
}

impl From<String> for EntryTimestamp {
    fn from(text: String) -> Self {
        EntryTimestamp::Text(text)
    }
}

fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Generate a new time-sortable entry id (UUID v7).
pub fn new_entry_id() -> String {
    Uuid::now_v7().to_string()
}

/// A single audit record.
///
/// Optional fields distinguish "absent" (`None`, omitted from the checksum
/// input) from "present but empty" (`Some("")`, `Some({})`, included).
/// Collapsing the two would change digests of previously stored chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Unique, time-sortable identifier.
    pub id: String,

    pub timestamp: EntryTimestamp,

    pub actor_id: String,

    pub actor_type: ActorType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    pub action: String,

    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Snapshot of the resource before the action.  Object key order is
    /// irrelevant to the checksum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_state: Option<Value>,

    /// Snapshot of the resource after the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_state: Option<Value>,

    /// Checksum of the chronologically preceding entry.  `None` only for the
    /// head of a chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_checksum: Option<String>,
}

impl AuditEntry {
    /// Check that every required field is populated and the timestamp
    /// resolves to an instant.
    ///
    /// Returns the resolved instant so callers do not parse twice.
    pub fn validate(&self) -> ChainsealResult<DateTime<Utc>> {
        let required: [(&'static str, &str); 4] = [
            ("id", self.id.as_str()),
            ("actorId", self.actor_id.as_str()),
            ("action", self.action.as_str()),
            ("resourceType", self.resource_type.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ChainsealError::MalformedEntry {
                    entry_id: self.id.clone(),
                    field,
                });
            }
        }

        match &self.timestamp {
            EntryTimestamp::Text(text) if text.trim().is_empty() => {
                Err(ChainsealError::MalformedEntry {
                    entry_id: self.id.clone(),
                    field: "timestamp",
                })
            }
            timestamp => timestamp.instant().ok_or_else(|| ChainsealError::InvalidTimestamp {
                entry_id: self.id.clone(),
                value: match timestamp {
                    EntryTimestamp::Text(text) => text.clone(),
                    EntryTimestamp::Instant(at) => at.to_rfc3339(),
                },
            }),
        }
    }
}

/// A draft audit event submitted to an `AuditWriter`.
///
/// The writer assigns the id, fills in the timestamp when none is given, and
/// links `previous_checksum` to the current chain head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub actor_id: String,
    pub actor_type: ActorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub action: String,
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_state: Option<Value>,
}

impl NewAuditEntry {
    pub fn new(
        actor_id: impl Into<String>,
        actor_type: ActorType,
        action: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: None,
            actor_id: actor_id.into(),
            actor_type,
            service_id: None,
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            before_state: None,
            after_state: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_before_state(mut self, state: Value) -> Self {
        self.before_state = Some(state);
        self
    }

    pub fn with_after_state(mut self, state: Value) -> Self {
        self.after_state = Some(state);
        self
    }

    /// Turn the draft into an entry linked to `previous_checksum`.
    pub fn into_entry(
        self,
        id: String,
        now: DateTime<Utc>,
        previous_checksum: Option<String>,
    ) -> AuditEntry {
        AuditEntry {
            id,
            timestamp: EntryTimestamp::Instant(self.timestamp.unwrap_or(now)),
            actor_id: self.actor_id,
            actor_type: self.actor_type,
            service_id: self.service_id,
            action: self.action,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            before_state: self.before_state,
            after_state: self.after_state,
            previous_checksum,
        }
    }
}
