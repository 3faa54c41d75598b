//! Complaint record model persisted by the store.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How badly a missing capability hurt the agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Every severity, lowest first.
    pub fn all() -> [Severity; 4] {
        [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ]
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(StoreError::ValidationFailed {
                field: "severity",
                message: format!("expected one of low, medium, high, critical; got {other:?}"),
            }),
        }
    }
}

/// Fields supplied by an agent when filing a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub agent_name: String,
    pub session_name: String,
    pub project_name: String,
    pub task_description: String,
    pub context_info: String,
    pub missing_info: String,
    pub confused_by: String,
    pub future_wishes: String,
    pub severity: Severity,
}

/// Persisted complaint record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplaintRecord {
    /// Record identifier, also the filename stem.
    pub id: Uuid,
    pub agent_name: String,
    pub session_name: String,
    pub project_name: String,
    pub task_description: String,
    pub context_info: String,
    pub missing_info: String,
    pub confused_by: String,
    pub future_wishes: String,
    pub severity: Severity,
    /// Creation time; never changes after the record is first saved.
    pub timestamp: DateTime<Utc>,
    /// Mirrors `resolved_at.is_some()`; kept in the file for readers.
    #[serde(default)]
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
}

impl ComplaintRecord {
    /// Create an open record with a fresh id and the current time.
    pub fn new(input: NewComplaint) -> Self {
        Self::with_identity(Uuid::new_v4(), Utc::now(), input)
    }

    /// Create an open record with an explicit id and creation time.
    pub fn with_identity(id: Uuid, timestamp: DateTime<Utc>, input: NewComplaint) -> Self {
        Self {
            id,
            agent_name: input.agent_name,
            session_name: input.session_name,
            project_name: input.project_name,
            task_description: input.task_description,
            context_info: input.context_info,
            missing_info: input.missing_info,
            confused_by: input.confused_by,
            future_wishes: input.future_wishes,
            severity: input.severity,
            timestamp,
            resolved: false,
            resolved_at: None,
            resolved_by: None,
        }
    }

    /// Whether the record has been resolved. Derived from `resolved_at`.
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }

    /// Reject records whose resolution fields disagree with each other.
    pub fn check_resolution(&self) -> Result<(), StoreError> {
        if self.resolved != self.resolved_at.is_some() {
            return Err(StoreError::ValidationFailed {
                field: "resolved",
                message: format!(
                    "resolved={} but resolved_at is {}",
                    self.resolved,
                    if self.resolved_at.is_some() { "set" } else { "unset" }
                ),
            });
        }
        if self.resolved_by.is_some() && self.resolved_at.is_none() {
            return Err(StoreError::ValidationFailed {
                field: "resolved_by",
                message: "set on a record that is not resolved".to_string(),
            });
        }
        Ok(())
    }

    /// Recompute `resolved` from `resolved_at` after reading a file that may
    /// have been written by something else. Returns true if anything changed.
    pub(crate) fn normalize_resolution(&mut self) -> bool {
        let resolved = self.resolved_at.is_some();
        let stray_by = !resolved && self.resolved_by.is_some();
        let changed = self.resolved != resolved || stray_by;
        self.resolved = resolved;
        if stray_by {
            self.resolved_by = None;
        }
        changed
    }

    /// Apply `self` as a rewrite of `stored`.
    ///
    /// The creation timestamp always comes from `stored`. Resolution is
    /// terminal: once `stored` is resolved its resolution fields win.
    pub(crate) fn rewrite_of(self, stored: &ComplaintRecord) -> ComplaintRecord {
        let mut next = ComplaintRecord {
            timestamp: stored.timestamp,
            ..self
        };
        if stored.is_resolved() {
            next.resolved = true;
            next.resolved_at = stored.resolved_at;
            next.resolved_by = stored.resolved_by.clone();
        }
        next
    }

    /// Move an open record to resolved. Returns false (and changes nothing)
    /// when it was already resolved.
    pub fn resolve(&mut self, resolved_by: &str, at: DateTime<Utc>) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.resolved = true;
        self.resolved_at = Some(at);
        self.resolved_by = Some(resolved_by.to_string());
        true
    }

    /// Case-insensitive substring match over the searchable text fields.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        [
            &self.agent_name,
            &self.project_name,
            &self.task_description,
            &self.context_info,
            &self.missing_info,
            &self.confused_by,
            &self.future_wishes,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }

    /// Ordering key for creation-order listings.
    pub(crate) fn creation_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.timestamp, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{ComplaintRecord, NewComplaint, Severity};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn input() -> NewComplaint {
        NewComplaint {
            agent_name: "builder".to_string(),
            session_name: String::new(),
            project_name: "Atlas".to_string(),
            task_description: "migrate tables".to_string(),
            context_info: String::new(),
            missing_info: "the Database Schema".to_string(),
            confused_by: String::new(),
            future_wishes: String::new(),
            severity: Severity::High,
        }
    }

    #[test]
    fn severity_parses_known_values_only() {
        assert_eq!("high".parse::<Severity>().expect("high"), Severity::High);
        assert_eq!(" Critical ".parse::<Severity>().expect("critical"), Severity::Critical);
        let err = "urgent".parse::<Severity>().unwrap_err();
        assert!(format!("{err}").contains("severity"));
        for severity in Severity::all() {
            assert_eq!(severity.to_string().parse::<Severity>().expect("round"), severity);
        }
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut record = ComplaintRecord::new(input());
        let first = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 2, 2, 3, 4, 5).unwrap();

        assert!(!record.is_resolved());
        assert!(record.resolve("alice", first));
        assert!(!record.resolve("bob", later));
        assert!(record.resolved);
        assert_eq!(record.resolved_at, Some(first));
        assert_eq!(record.resolved_by.as_deref(), Some("alice"));
    }

    #[test]
    fn open_record_omits_resolution_fields() {
        let record = ComplaintRecord::new(input());
        let value = serde_json::to_value(&record).expect("json");
        let map = value.as_object().expect("object");
        assert!(!map.contains_key("resolved_at"));
        assert!(!map.contains_key("resolved_by"));
        assert_eq!(map.get("severity"), Some(&Value::from("high")));
        assert_eq!(map.get("resolved"), Some(&Value::from(false)));
    }

    #[test]
    fn mismatched_resolution_fields_are_rejected() {
        let mut torn = ComplaintRecord::new(input());
        torn.resolved = true;
        assert!(torn.check_resolution().is_err());
        assert!(!torn.is_resolved());

        let mut stray = ComplaintRecord::new(input());
        stray.resolved_by = Some("alice".to_string());
        assert!(stray.check_resolution().is_err());

        let mut resolved = ComplaintRecord::new(input());
        resolved.resolve("alice", Utc::now());
        resolved.check_resolution().expect("consistent");
    }

    #[test]
    fn normalize_derives_resolved_flag() {
        let mut torn = ComplaintRecord::new(input());
        torn.resolved = true;
        torn.resolved_by = Some("alice".to_string());
        assert!(torn.normalize_resolution());
        assert!(!torn.resolved);
        assert_eq!(torn.resolved_by, None);
        assert!(!torn.normalize_resolution());
    }

    #[test]
    fn rewrite_keeps_stored_resolution_and_timestamp() {
        let open = ComplaintRecord::new(input());
        let mut stored = open.clone();
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        stored.resolve("alice", at);

        let mut stale = open.clone();
        stale.timestamp = at;
        stale.confused_by = "new detail".to_string();
        let next = stale.rewrite_of(&stored);

        assert_eq!(next.timestamp, open.timestamp);
        assert_eq!(next.confused_by, "new detail");
        assert!(next.resolved);
        assert_eq!(next.resolved_at, Some(at));
        assert_eq!(next.resolved_by.as_deref(), Some("alice"));
    }

    #[test]
    fn text_match_ignores_case() {
        let record = ComplaintRecord::new(input());
        assert!(record.matches_text("schema"));
        assert!(record.matches_text("atlas"));
        assert!(!record.matches_text("nonexistent-term"));
    }
}
