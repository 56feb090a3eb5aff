//! The `bugs` table.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ParseEnumError, Table};

/// Marker type for the `bugs` table.
#[derive(Debug, Clone, Copy)]
pub struct Bugs;

impl Table for Bugs {
    const NAME: &'static str = "bugs";

    type Row = Bug;
    type Insert = NewBug;
    type Update = BugUpdate;
}

// ── Enums ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl BugStatus {
    pub const ALL: [BugStatus; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for BugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BugStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "status",
                value: s.to_string(),
                expected: "open, in_progress, resolved, closed",
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl BugPriority {
    pub const ALL: [BugPriority; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for BugPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BugPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "priority",
                value: s.to_string(),
                expected: "low, medium, high, critical",
            })
    }
}

// ── Shapes ────────────────────────────────────────────────────────────────────

/// A stored bug report, as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: BugStatus,
    pub priority: BugPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// External user identity.
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
}

/// Insert payload. Only `title` is required; every omitted field is left
/// out of the JSON so the server fills it (`status = open`,
/// `priority = medium`, generated id and timestamps).
///
/// Nullable columns are tri-state: `None` omits the field, `Some(None)`
/// sends an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBug {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::nullable"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BugStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<BugPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::nullable"
    )]
    pub assigned_to: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::nullable"
    )]
    pub reporter: Option<Option<String>>,
}

impl NewBug {
    /// The minimal insert: a title and nothing else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            created_at: None,
            updated_at: None,
            assigned_to: None,
            reporter: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn with_status(mut self, status: BugStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: BugPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_assignee(mut self, user: impl Into<String>) -> Self {
        self.assigned_to = Some(Some(user.into()));
        self
    }

    pub fn with_reporter(mut self, user: impl Into<String>) -> Self {
        self.reporter = Some(Some(user.into()));
        self
    }
}

/// Update payload. Every field is optional and `BugUpdate::default()`
/// serializes to `{}`. Nullable columns follow the same tri-state rule as
/// [`NewBug`], so `assigned_to: Some(None)` unassigns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BugUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::nullable"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BugStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<BugPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::nullable"
    )]
    pub assigned_to: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::nullable"
    )]
    pub reporter: Option<Option<String>>,
}

impl BugUpdate {
    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `None` clears the description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn status(mut self, status: BugStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: BugPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// `None` unassigns.
    pub fn assigned_to(mut self, user: Option<String>) -> Self {
        self.assigned_to = Some(user);
        self
    }

    /// Stamp `updated_at` explicitly instead of leaving it to the server.
    pub fn touched_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROW: &str = r#"{
        "id": "6f1c2a0e-0000-4000-8000-000000000001",
        "title": "Crash on save",
        "description": null,
        "status": "in_progress",
        "priority": "critical",
        "created_at": "2024-03-01T10:00:00.123456+00:00",
        "updated_at": "2024-03-02T08:30:00Z",
        "assigned_to": "user-1",
        "reporter": null
    }"#;

    #[test]
    fn row_decodes_postgrest_timestamps() {
        let bug: Bug = serde_json::from_str(ROW).unwrap();
        assert_eq!(bug.status, BugStatus::InProgress);
        assert_eq!(bug.priority, BugPriority::Critical);
        assert_eq!(bug.description, None);
        assert_eq!(bug.assigned_to.as_deref(), Some("user-1"));
        assert!(bug.updated_at > bug.created_at);
    }

    #[test]
    fn row_with_unknown_status_fails() {
        let bad = ROW.replace("in_progress", "wontfix");
        assert!(serde_json::from_str::<Bug>(&bad).is_err());
    }

    #[test]
    fn minimal_insert_is_title_only() {
        let v = serde_json::to_value(NewBug::new("Login broken")).unwrap();
        assert_eq!(v, json!({ "title": "Login broken" }));
    }

    #[test]
    fn insert_accepts_title_only_json() {
        let b: NewBug = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(b, NewBug::new("x"));
    }

    #[test]
    fn insert_without_title_rejected() {
        assert!(serde_json::from_value::<NewBug>(json!({ "status": "open" })).is_err());
    }

    #[test]
    fn insert_builder_fields() {
        let v = serde_json::to_value(
            NewBug::new("t")
                .with_priority(BugPriority::High)
                .with_status(BugStatus::Resolved)
                .with_reporter("user-9"),
        )
        .unwrap();
        assert_eq!(
            v,
            json!({ "title": "t", "priority": "high", "status": "resolved", "reporter": "user-9" })
        );
    }

    #[test]
    fn empty_update_is_empty_object() {
        let u = BugUpdate::default();
        assert!(u.is_empty());
        assert_eq!(serde_json::to_string(&u).unwrap(), "{}");
        let back: BugUpdate = serde_json::from_str("{}").unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let cleared = BugUpdate::default().assigned_to(None);
        assert_eq!(serde_json::to_value(&cleared).unwrap(), json!({ "assigned_to": null }));

        let parsed: BugUpdate = serde_json::from_value(json!({ "assigned_to": null })).unwrap();
        assert_eq!(parsed.assigned_to, Some(None));
        assert_eq!(parsed.reporter, None);
        assert!(!parsed.is_empty());
    }

    #[test]
    fn touched_at_sets_only_updated_at() {
        let at: DateTime<Utc> = "2024-03-02T08:30:00Z".parse().unwrap();
        let u = BugUpdate::default().status(BugStatus::Closed).touched_at(at);
        assert_eq!(u.updated_at, Some(at));
        assert_eq!(u.created_at, None);

        let v = serde_json::to_value(&u).unwrap();
        assert_eq!(v.as_object().unwrap().len(), 2);
        assert_eq!(v["status"], "closed");
        let back: BugUpdate = serde_json::from_value(v).unwrap();
        assert_eq!(back, u);
    }

    #[test]
    fn enum_defaults() {
        assert_eq!(BugStatus::default(), BugStatus::Open);
        assert_eq!(BugPriority::default(), BugPriority::Medium);
    }

    #[test]
    fn enums_parse_wire_values() {
        for s in BugStatus::ALL {
            assert_eq!(s.as_str().parse::<BugStatus>().unwrap(), s);
            assert_eq!(serde_json::to_value(s).unwrap(), json!(s.as_str()));
        }
        for p in BugPriority::ALL {
            assert_eq!(p.as_str().parse::<BugPriority>().unwrap(), p);
        }
    }

    #[test]
    fn enums_reject_unknown_values() {
        let err = "blocker".parse::<BugPriority>().unwrap_err();
        assert_eq!(err.kind, "priority");
        assert!(err.to_string().contains("blocker"));
        assert!("In_Progress".parse::<BugStatus>().is_err());
        assert!("".parse::<BugStatus>().is_err());
    }

    #[test]
    fn priority_orders_by_severity() {
        assert!(BugPriority::Low < BugPriority::Critical);
        assert!(BugPriority::Medium < BugPriority::High);
    }
}
