//! Issue model, status and priority enumerations.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::AppError;

/// Workflow status of an issue.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IssueStatus {
    /// Not yet started.
    #[default]
    Open,
    /// Someone is working on it.
    #[serde(rename = "In-Progress")]
    InProgress,
    /// Done or abandoned.
    Closed,
}

impl IssueStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Open, Self::InProgress, Self::Closed];

    /// Label used on the wire and in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In-Progress",
            Self::Closed => "Closed",
        }
    }
}

impl Display for IssueStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Self::Open),
            "In-Progress" => Ok(Self::InProgress),
            "Closed" => Ok(Self::Closed),
            _ => Err(AppError::Validation(
                "Status must be one of: Open, In-Progress, Closed".into(),
            )),
        }
    }
}

/// Declared urgency of an issue.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal urgency.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Label used on the wire and in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Ordering weight: High = 3, Medium = 2, Low = 1.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            _ => Err(AppError::Validation(
                "Priority must be one of: Low, Medium, High".into(),
            )),
        }
    }
}

/// Issue as read from the store, with its assignee resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Database identifier.
    pub id: i64,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Workflow status.
    pub status: IssueStatus,
    /// Declared priority.
    pub priority: Priority,
    /// Assigned user identifier, if any.
    pub assignee_id: Option<i64>,
    /// Assigned user, if any.
    pub assignee: Option<User>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
}

impl Issue {
    /// Assignee display name, or `"Unassigned"`.
    #[must_use]
    pub fn assignee_name(&self) -> &str {
        self.assignee.as_ref().map_or("Unassigned", |u| u.name.as_str())
    }
}

/// Fields required to create an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Initial status.
    pub status: IssueStatus,
    /// Declared priority.
    pub priority: Priority,
    /// Assigned user identifier.
    pub assignee_id: Option<i64>,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
}

impl NewIssue {
    /// Open, medium-priority, unassigned issue with no deadline.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: IssueStatus::default(),
            priority: Priority::default(),
            assignee_id: None,
            due_date: None,
        }
    }
}

/// Partial update; `None` leaves the field untouched.
///
/// The doubly optional fields distinguish "leave as is" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<IssueStatus>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New assignee, or unassign.
    pub assignee_id: Option<Option<i64>>,
    /// New deadline, or clear it.
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl IssuePatch {
    /// Apply the patch to an issue in place.
    pub fn apply(&self, issue: &mut Issue) {
        if let Some(ref title) = self.title {
            issue.title.clone_from(title);
        }
        if let Some(ref description) = self.description {
            issue.description.clone_from(description);
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
        if let Some(assignee_id) = self.assignee_id {
            if issue.assignee_id != assignee_id {
                issue.assignee = None;
            }
            issue.assignee_id = assignee_id;
        }
        if let Some(due_date) = self.due_date {
            issue.due_date = due_date;
        }
    }
}

/// Parse an ISO-8601 date or date-time.
///
/// Accepts RFC 3339 (`2024-06-10T09:00:00Z`), naive date-times
/// (`2024-06-10T09:00`, `2024-06-10 09:00:00`) and plain dates
/// (`2024-06-10`). Naive values are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
