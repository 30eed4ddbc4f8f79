//! Query parameters and results for `query_tasks`.

use chrono_tz::Tz;
use serde::Serialize;
use tick_mcp_core::{Task, TaskFilter};
use time::OffsetDateTime;

use crate::filter_util::{FilterBuildResult, TaskFilterBuilder};

/// User-facing query criteria. Every field is optional; all present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub task_id: Option<String>,
    /// Project id or `inbox`.
    pub project_id: Option<String>,
    /// `none`, `low`, `medium`, `high` or 0/1/3/5.
    pub priority: Option<String>,
    /// `today`, `tomorrow`, `overdue`, `next_7_days` or `custom`.
    pub date_filter: Option<String>,
    /// Window length for `custom`.
    pub custom_days: Option<i64>,
    pub search_term: Option<String>,
    /// IANA zone overriding the configured one.
    pub timezone: Option<String>,
}

impl TaskQuery {
    /// Resolve into a [`TaskFilter`] at `reference`.
    ///
    /// # Errors
    /// Returns an error for malformed priorities, date tokens or timezones.
    pub fn into_filter(self, reference: OffsetDateTime, default_tz: Tz) -> FilterBuildResult<TaskFilter> {
        TaskFilterBuilder::new()
            .with_task_id(self.task_id)
            .with_project(self.project_id)
            .with_priority(self.priority)?
            .with_date_filter(self.date_filter, self.custom_days)
            .with_text(self.search_term)
            .with_timezone(self.timezone)
            .build(reference, default_tz)
    }
}

/// Matching tasks in scan order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub count: usize,
    pub tasks: Vec<Task>,
}

impl From<Vec<Task>> for QueryResult {
    fn from(tasks: Vec<Task>) -> Self {
        Self {
            count: tasks.len(),
            tasks,
        }
    }
}
