//! Model-facing item inputs for the batch tools and their validation into [`Mutation`]s.
//!
//! Every field is optional at the serde level so that a missing required field fails
//! only the offending item instead of the whole request.

use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::batch::BatchInput;
use crate::date_window::{parse_timezone, start_of_day};
use crate::error::ValidationError;
use crate::model::{Priority, ProjectRef};
use crate::mutation::{Mutation, NewTask, TaskPatch, TaskRef};
use crate::wire_time::{parse_date, parse_timestamp};

/// Defaults applied while validating inputs.
#[derive(Debug, Clone, Copy)]
pub struct InputContext {
    /// Zone used for bare dates when the item has no `time_zone`.
    pub timezone: Tz,
}

/// Priority given either by name (`high`) or provider level (`5`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PriorityInput {
    /// Provider level: 0, 1, 3 or 5.
    Level(i64),
    /// `none`, `low`, `medium` or `high`.
    Name(String),
}

impl PriorityInput {
    /// Convert into a [`Priority`].
    ///
    /// # Errors
    /// Returns a validation error for unknown names or levels other than 0/1/3/5.
    pub fn resolve(&self) -> Result<Priority, ValidationError> {
        let parsed = match self {
            Self::Level(level) => level.to_string().parse::<Priority>(),
            Self::Name(name) => name.parse::<Priority>(),
        };
        parsed.map_err(|err| ValidationError::invalid("priority", err.to_string()))
    }
}

/// Fields for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaskInput {
    /// Task title (required).
    #[serde(default)]
    pub title: Option<String>,
    /// Project id, or `inbox` (required).
    #[serde(default)]
    pub project_id: Option<String>,
    /// Task body.
    #[serde(default)]
    pub content: Option<String>,
    /// Checklist description.
    #[serde(default)]
    pub desc: Option<String>,
    /// `none`, `low`, `medium`, `high` or 0/1/3/5.
    #[serde(default)]
    pub priority: Option<PriorityInput>,
    /// RFC 3339 timestamp, or `YYYY-MM-DD` for an all-day date.
    #[serde(default)]
    pub due_date: Option<String>,
    /// RFC 3339 timestamp, or `YYYY-MM-DD` for an all-day date.
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub is_all_day: Option<bool>,
    /// IANA timezone the dates are authored in, e.g. `Asia/Tokyo`.
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Reminder triggers such as `TRIGGER:PT0S` or `TRIGGER:-PT30M`.
    #[serde(default)]
    pub reminders: Option<Vec<String>>,
    /// Recurrence rule such as `RRULE:FREQ=DAILY;INTERVAL=1`.
    #[serde(default)]
    pub repeat_flag: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Fields for updating a task. Only provided fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaskUpdateInput {
    /// Task to update (required).
    #[serde(default)]
    pub task_id: Option<String>,
    /// Project containing the task, or `inbox` (required).
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub priority: Option<PriorityInput>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub is_all_day: Option<bool>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub reminders: Option<Vec<String>>,
    #[serde(default)]
    pub repeat_flag: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Addresses a task for completion or deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaskRefInput {
    /// Project containing the task, or `inbox`.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Task identifier.
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Fields for creating a subtask under an existing task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SubtaskInput {
    /// Subtask title (required).
    #[serde(default)]
    pub subtask_title: Option<String>,
    /// Parent task identifier (required).
    #[serde(default)]
    pub parent_task_id: Option<String>,
    /// Project containing the parent task, or `inbox` (required).
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub priority: Option<PriorityInput>,
}

impl TaskInput {
    /// Validate into a create request.
    ///
    /// # Errors
    /// Fails when `title` or `project_id` is missing, or a field does not parse.
    pub fn into_new_task(self, ctx: &InputContext) -> Result<NewTask, ValidationError> {
        let title = required("title", self.title)?;
        let project = project_ref(self.project_id)?;
        let zone = item_zone(self.time_zone.as_deref(), ctx)?;

        let mut task = NewTask::new(project, title);
        task.content = self.content;
        task.desc = self.desc;
        task.priority = self.priority.as_ref().map(PriorityInput::resolve).transpose()?;

        let due = parse_task_date("due_date", self.due_date.as_deref(), zone)?;
        let start = parse_task_date("start_date", self.start_date.as_deref(), zone)?;
        task.due_date = due.map(|date| date.instant);
        task.start_date = start.map(|date| date.instant);
        task.is_all_day = self.is_all_day.or_else(|| all_day_hint(due, start));
        task.time_zone = authored_zone(self.time_zone, due.or(start), zone);
        task.reminders = self.reminders.unwrap_or_default();
        task.repeat_flag = self.repeat_flag;
        task.tags = self.tags.unwrap_or_default();
        Ok(task)
    }
}

impl TaskUpdateInput {
    /// Validate into an update request, possibly one without changes.
    ///
    /// # Errors
    /// Fails when `task_id` or `project_id` is missing, or a field does not parse.
    pub fn into_patch(self, ctx: &InputContext) -> Result<TaskPatch, ValidationError> {
        let task_id = required("task_id", self.task_id)?;
        let project = project_ref(self.project_id)?;
        let zone = item_zone(self.time_zone.as_deref(), ctx)?;

        let mut patch = TaskPatch::empty(task_id, project);
        patch.title = self.title;
        patch.content = self.content;
        patch.desc = self.desc;
        patch.priority = self.priority.as_ref().map(PriorityInput::resolve).transpose()?;

        let due = parse_task_date("due_date", self.due_date.as_deref(), zone)?;
        let start = parse_task_date("start_date", self.start_date.as_deref(), zone)?;
        patch.due_date = due.map(|date| date.instant);
        patch.start_date = start.map(|date| date.instant);
        patch.is_all_day = self.is_all_day.or_else(|| all_day_hint(due, start));
        patch.time_zone = authored_zone(self.time_zone, due.or(start), zone);
        patch.reminders = self.reminders;
        patch.repeat_flag = self.repeat_flag;
        patch.tags = self.tags;
        Ok(patch)
    }
}

impl TaskRefInput {
    /// Validate into a task reference.
    ///
    /// # Errors
    /// Fails when either identifier is missing.
    pub fn into_task_ref(self) -> Result<TaskRef, ValidationError> {
        let project = project_ref(self.project_id)?;
        let task_id = required("task_id", self.task_id)?;
        Ok(TaskRef { project, task_id })
    }
}

impl SubtaskInput {
    /// Validate into a subtask creation.
    ///
    /// # Errors
    /// Fails when the title, parent or project is missing.
    pub fn into_mutation(self) -> Result<Mutation, ValidationError> {
        let title = required("subtask_title", self.subtask_title)?;
        let parent_task_id = required("parent_task_id", self.parent_task_id)?;
        let project = project_ref(self.project_id)?;

        let mut task = NewTask::new(project, title);
        task.content = self.content;
        task.priority = self.priority.as_ref().map(PriorityInput::resolve).transpose()?;
        Ok(Mutation::CreateSubtask {
            parent_task_id,
            task,
        })
    }
}

/// Validate a project id for deletion.
///
/// # Errors
/// Fails for blank ids and for the inbox.
pub fn project_deletion(project_id: String) -> Result<Mutation, ValidationError> {
    match project_ref(Some(project_id))? {
        ProjectRef::Inbox => Err(ValidationError::InboxNotDeletable),
        project @ ProjectRef::Id(_) => Ok(Mutation::DeleteProject(project)),
    }
}

impl BatchInput for TaskInput {
    fn identifier(&self) -> Option<String> {
        non_blank(self.title.as_deref())
    }
}

impl BatchInput for TaskUpdateInput {
    fn identifier(&self) -> Option<String> {
        non_blank(self.task_id.as_deref())
    }
}

impl BatchInput for TaskRefInput {
    fn identifier(&self) -> Option<String> {
        non_blank(self.task_id.as_deref())
    }
}

impl BatchInput for SubtaskInput {
    fn identifier(&self) -> Option<String> {
        non_blank(self.subtask_title.as_deref())
    }
}

impl BatchInput for String {
    fn identifier(&self) -> Option<String> {
        non_blank(Some(self))
    }
}

#[derive(Debug, Clone, Copy)]
struct TaskDate {
    instant: OffsetDateTime,
    all_day: bool,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    non_blank(value.as_deref()).ok_or(ValidationError::MissingField(field))
}

fn project_ref(value: Option<String>) -> Result<ProjectRef, ValidationError> {
    value
        .as_deref()
        .and_then(ProjectRef::parse)
        .ok_or(ValidationError::MissingField("project_id"))
}

fn item_zone(time_zone: Option<&str>, ctx: &InputContext) -> Result<Tz, ValidationError> {
    match non_blank(time_zone) {
        Some(name) => parse_timezone(&name).map_err(|err| ValidationError::invalid("time_zone", err.to_string())),
        None => Ok(ctx.timezone),
    }
}

fn parse_task_date(
    field: &'static str,
    raw: Option<&str>,
    zone: Tz,
) -> Result<Option<TaskDate>, ValidationError> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };
    if let Some(date) = parse_date(&raw) {
        let instant = start_of_day(date, zone).map_err(|err| ValidationError::invalid(field, err.to_string()))?;
        return Ok(Some(TaskDate {
            instant,
            all_day: true,
        }));
    }
    parse_timestamp(&raw)
        .map(|instant| {
            Some(TaskDate {
                instant,
                all_day: false,
            })
        })
        .map_err(|err| ValidationError::invalid(field, format!("{err} (expected RFC 3339 or YYYY-MM-DD)")))
}

fn all_day_hint(due: Option<TaskDate>, start: Option<TaskDate>) -> Option<bool> {
    due.or(start).filter(|date| date.all_day).map(|_| true)
}

// Dates keep the zone they were written in so the provider renders them correctly.
fn authored_zone(explicit: Option<String>, date: Option<TaskDate>, zone: Tz) -> Option<String> {
    non_blank(explicit.as_deref()).or_else(|| date.map(|_| zone.name().to_owned()))
}
