//! Task and project records as exchanged with the TickTick open API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use time::OffsetDateTime;

/// Reference to a project, with the inbox modelled explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectRef {
    /// The provider's virtual inbox project.
    Inbox,
    /// A provider-assigned project identifier.
    Id(String),
}

impl ProjectRef {
    /// Reserved identifier for the inbox.
    pub const INBOX: &'static str = "inbox";

    /// Parse a user-supplied project identifier. Blank input yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.eq_ignore_ascii_case(Self::INBOX) {
            Some(Self::Inbox)
        } else {
            Some(Self::Id(trimmed.to_owned()))
        }
    }

    /// Identifier used in request paths and bodies.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => Self::INBOX,
            Self::Id(id) => id,
        }
    }

    /// Whether a task's `projectId` belongs to this project.
    #[must_use]
    pub fn matches(&self, project_id: &str) -> bool {
        match self {
            Self::Inbox => is_inbox_id(project_id),
            Self::Id(id) => id == project_id,
        }
    }

    /// Returns true for the inbox reference.
    #[must_use]
    pub const fn is_inbox(&self) -> bool {
        matches!(self, Self::Inbox)
    }
}

/// The provider reports inbox tasks under `inbox<user-number>`.
#[must_use]
pub fn is_inbox_id(project_id: &str) -> bool {
    project_id
        .strip_prefix(ProjectRef::INBOX)
        .is_some_and(|rest| rest.bytes().all(|b| b.is_ascii_digit()))
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProjectRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom("project id must not be blank"))
    }
}

/// Task priority. Ordered `None < Low < Medium < High`; wire values are 0/1/3/5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Priority {
    /// No priority.
    #[default]
    None,
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Every priority, lowest first.
    pub const ALL: [Self; 4] = [Self::None, Self::Low, Self::Medium, Self::High];
}

impl From<i64> for Priority {
    fn from(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Self::None,
            1 => Self::Low,
            2 | 3 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::None => 0,
            Priority::Low => 1,
            Priority::Medium => 3,
            Priority::High => 5,
        }
    }
}

/// Error returned when a priority token is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid priority: {token} (expected none, low, medium, high or 0, 1, 3, 5)")]
pub struct ParsePriorityError {
    /// The rejected input.
    pub token: String,
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "0" => Ok(Self::None),
            "low" | "1" => Ok(Self::Low),
            "medium" | "3" => Ok(Self::Medium),
            "high" | "5" => Ok(Self::High),
            _ => Err(ParsePriorityError { token: s.to_owned() }),
        }
    }
}

/// Completion state of a task. Wire values are 0 (open) and 2 (completed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TaskStatus {
    /// Not yet completed.
    #[default]
    Open,
    /// Completed.
    Completed,
}

impl From<i64> for TaskStatus {
    fn from(value: i64) -> Self {
        if value == 2 { Self::Completed } else { Self::Open }
    }
}

impl From<TaskStatus> for i64 {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Open => 0,
            TaskStatus::Completed => 2,
        }
    }
}

/// Project board layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Plain list.
    List,
    /// Kanban columns.
    Kanban,
    /// Timeline view.
    Timeline,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "kanban" => Ok(Self::Kanban),
            "timeline" => Ok(Self::Timeline),
            _ => Err(format!("invalid view mode: {s} (expected list, kanban or timeline)")),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A task as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Provider-assigned identifier.
    pub id: String,
    /// Owning project; inbox tasks use `inbox<user-number>`.
    pub project_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Checklist description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    /// Due instant; compared in absolute time.
    #[serde(default, with = "crate::wire_time::option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default, with = "crate::wire_time::option", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<OffsetDateTime>,
    /// Timezone the dates were authored in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_all_day: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    /// Parent task for subtasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Recurrence rule (`RRULE:...`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_flag: Option<String>,
    /// Reminder triggers (`TRIGGER:PT0S`).
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, with = "crate::wire_time::option", skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<OffsetDateTime>,
}

impl Task {
    /// Whether the task has been completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Whether the task lives in the inbox.
    #[must_use]
    pub fn in_inbox(&self) -> bool {
        is_inbox_id(&self.project_id)
    }
}

/// A project as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Provider-assigned identifier.
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<ViewMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// `TASK` or `NOTE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

impl Project {
    /// Placeholder record for the inbox, which the provider does not describe.
    #[must_use]
    pub fn inbox() -> Self {
        Self {
            id: ProjectRef::INBOX.to_owned(),
            name: "Inbox".to_owned(),
            color: None,
            view_mode: None,
            closed: None,
            group_id: None,
            kind: None,
            sort_order: None,
        }
    }

    /// Archived projects are skipped by cross-project queries.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.unwrap_or(false)
    }
}

/// A project together with its open tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Project metadata.
    pub project: Project,
    /// Open tasks, in provider order.
    pub tasks: Vec<Task>,
}
