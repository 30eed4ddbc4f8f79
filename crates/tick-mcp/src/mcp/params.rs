//! Parameter definitions for MCP tools.
//!
//! Batch tools accept either a single item or a list of items under the same key.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tick_mcp_core::{BatchItem, OneOrMany, SubtaskInput, TaskInput, TaskRefInput, TaskUpdateInput};

/// Parameters for fetching one project.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProjectIdParams {
    /// Project ID, or `inbox`.
    pub project_id: String,
}

/// Parameters for creating a project.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateProjectParams {
    /// Project name.
    pub name: String,
    /// Hex color such as `#F18181`.
    #[serde(default)]
    pub color: Option<String>,
    /// `list`, `kanban` or `timeline`. Defaults to `list`.
    #[serde(default)]
    pub view_mode: Option<String>,
}

/// Parameters for deleting projects.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteProjectsParams {
    /// One project ID or a list of IDs. The inbox cannot be deleted.
    pub projects: OneOrMany<BatchItem<String>>,
}

/// Parameters for creating tasks.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTasksParams {
    /// One task or a list of tasks. `title` and `project_id` are required per task.
    pub tasks: OneOrMany<BatchItem<TaskInput>>,
}

/// Parameters for updating tasks.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTasksParams {
    /// One update or a list of updates. `task_id` and `project_id` are required; other
    /// fields are changed only when present.
    pub tasks: OneOrMany<BatchItem<TaskUpdateInput>>,
}

/// Parameters for completing or deleting tasks.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TaskRefsParams {
    /// One `{project_id, task_id}` pair or a list of pairs.
    pub tasks: OneOrMany<BatchItem<TaskRefInput>>,
}

/// Parameters for creating subtasks.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateSubtasksParams {
    /// One subtask or a list of subtasks.
    pub subtasks: OneOrMany<BatchItem<SubtaskInput>>,
}

/// Parameters for filtering tasks. All given criteria must match.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct QueryTasksParams {
    /// Return only this task; other criteria are ignored.
    #[serde(default)]
    pub task_id: Option<String>,
    /// Restrict to one project ID, or `inbox`.
    #[serde(default)]
    pub project_id: Option<String>,
    /// `none`, `low`, `medium`, `high`, or the level 0/1/3/5.
    #[serde(default)]
    pub priority: Option<String>,
    /// `today`, `tomorrow`, `overdue`, `next_7_days` or `custom`.
    #[serde(default)]
    pub date_filter: Option<String>,
    /// Number of days from today, required when `date_filter` is `custom`.
    #[serde(default)]
    pub custom_days: Option<i64>,
    /// Case-insensitive text matched against title and content.
    #[serde(default)]
    pub search_term: Option<String>,
    /// IANA timezone for the date window, e.g. `Asia/Tokyo`. Defaults to the configured zone.
    #[serde(default)]
    pub timezone: Option<String>,
}
