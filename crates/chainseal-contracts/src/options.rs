//! Scope controls for a verification run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    entry::AuditEntry,
    error::{ChainsealError, ChainsealResult},
};

/// Default ceiling on the number of entries verified in one run.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// What precedes the first entry of a verification window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WindowAnchor {
    /// Nothing is known about the predecessor; its link is not checked.
    #[default]
    Unanchored,
    /// The window starts at the true chain head, which must carry no
    /// `previous_checksum`.
    Genesis,
    /// The window starts mid-chain; the first entry must link to `checksum`.
    Predecessor { entry_id: String, checksum: String },
}

/// Options for one `verify_chain` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainVerificationOptions {
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,

    /// Maximum number of entries.  `None` falls back to the verifier's
    /// configured `max_entries`.
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub actor_id: Option<String>,

    #[serde(default)]
    pub service_id: Option<String>,

    #[serde(default)]
    pub stop_on_first_invalid: bool,

    /// Accept windows larger than the limit instead of failing.
    #[serde(default)]
    pub allow_oversized: bool,

    #[serde(default)]
    pub anchor: WindowAnchor,
}

impl ChainVerificationOptions {
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn for_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn for_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn stop_on_first_invalid(mut self) -> Self {
        self.stop_on_first_invalid = true;
        self
    }

    pub fn allow_oversized(mut self) -> Self {
        self.allow_oversized = true;
        self
    }

    pub fn anchored(mut self, anchor: WindowAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// True when an actor or service filter narrows the window, so adjacent
    /// entries are not necessarily chain neighbours.
    pub fn is_filtered(&self) -> bool {
        self.actor_id.is_some() || self.service_id.is_some()
    }

    /// Reject inconsistent or unsupported option combinations.
    pub fn validate(&self) -> ChainsealResult<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ChainsealError::InvalidOptions {
                    reason: format!("end date {end} is before start date {start}"),
                });
            }
        }

        if self.limit == Some(0) {
            return Err(ChainsealError::InvalidOptions {
                reason: "limit must be greater than zero".to_string(),
            });
        }

        if self.is_filtered() && self.anchor != WindowAnchor::Unanchored {
            return Err(ChainsealError::InvalidOptions {
                reason: "actor/service filtered windows cannot be anchored to the chain"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// True when `entry` falls inside the date bounds and filters.
    ///
    /// Entries whose timestamp cannot be resolved never match a date-bounded
    /// window.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(actor_id) = &self.actor_id {
            if &entry.actor_id != actor_id {
                return false;
            }
        }
        if let Some(service_id) = &self.service_id {
            if entry.service_id.as_ref() != Some(service_id) {
                return false;
            }
        }
        if self.start_date.is_none() && self.end_date.is_none() {
            return true;
        }

        let Some(at) = entry.timestamp.instant() else {
            return false;
        };
        self.start_date.map_or(true, |start| at >= start)
            && self.end_date.map_or(true, |end| at <= end)
    }
}
