//! Validated write operations, serialized as provider request bodies.

use serde::Serialize;
use time::OffsetDateTime;

use crate::model::{Priority, ProjectRef, ViewMode};

/// Which batch tool produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateTasks,
    UpdateTasks,
    CompleteTasks,
    DeleteTasks,
    CreateSubtasks,
    DeleteProjects,
}

/// Body for `POST /project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<ViewMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Body for `POST /task`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(rename = "projectId")]
    pub project: ProjectRef,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(with = "crate::wire_time::option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "crate::wire_time::option", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_flag: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl NewTask {
    /// A task with only the required fields set.
    #[must_use]
    pub const fn new(project: ProjectRef, title: String) -> Self {
        Self {
            project,
            title,
            content: None,
            desc: None,
            priority: None,
            due_date: None,
            start_date: None,
            is_all_day: None,
            time_zone: None,
            reminders: Vec::new(),
            repeat_flag: None,
            tags: Vec::new(),
            parent_id: None,
        }
    }
}

/// Body for `POST /task/{id}`. Absent fields are left untouched by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(rename = "id")]
    pub task_id: String,
    #[serde(rename = "projectId")]
    pub project: ProjectRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(with = "crate::wire_time::option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "crate::wire_time::option", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// An update that changes nothing.
    #[must_use]
    pub const fn empty(task_id: String, project: ProjectRef) -> Self {
        Self {
            task_id,
            project,
            title: None,
            content: None,
            desc: None,
            priority: None,
            due_date: None,
            start_date: None,
            is_all_day: None,
            time_zone: None,
            reminders: None,
            repeat_flag: None,
            tags: None,
        }
    }

    /// Whether at least one mutable field is set.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.desc.is_some()
            || self.priority.is_some()
            || self.due_date.is_some()
            || self.start_date.is_some()
            || self.is_all_day.is_some()
            || self.time_zone.is_some()
            || self.reminders.is_some()
            || self.repeat_flag.is_some()
            || self.tags.is_some()
    }
}

/// Addresses one task for complete/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    pub project: ProjectRef,
    pub task_id: String,
}

/// One validated write, dispatched as exactly one store call.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateTask(NewTask),
    CreateSubtask {
        parent_task_id: String,
        task: NewTask,
    },
    UpdateTask(TaskPatch),
    CompleteTask(TaskRef),
    DeleteTask(TaskRef),
    DeleteProject(ProjectRef),
}
