//! Batch task tools.
//!
//! Each handler returns the batch report even when some items failed; only invocation-level
//! failures (rejected credentials) become MCP errors.

use crate::mcp::params::{CreateSubtasksParams, CreateTasksParams, TaskRefsParams, UpdateTasksParams};
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use tick_mcp_app::{ServiceError, TaskService};
use tick_mcp_client::TaskStore;
use tick_mcp_core::BatchReport;

use super::common::{json_result, map_service_error};

fn report_result(report: Result<BatchReport, ServiceError>) -> Result<CallToolResult, McpError> {
    let report = report.map_err(|err| map_service_error(&err))?;
    json_result(&report)
}

/// Create one or more tasks.
pub async fn handle_create_tasks<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<CreateTasksParams>,
) -> Result<CallToolResult, McpError> {
    report_result(service.create_tasks(params.tasks).await)
}

/// Update one or more tasks.
pub async fn handle_update_tasks<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<UpdateTasksParams>,
) -> Result<CallToolResult, McpError> {
    report_result(service.update_tasks(params.tasks).await)
}

/// Complete one or more tasks.
pub async fn handle_complete_tasks<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<TaskRefsParams>,
) -> Result<CallToolResult, McpError> {
    report_result(service.complete_tasks(params.tasks).await)
}

/// Delete one or more tasks.
pub async fn handle_delete_tasks<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<TaskRefsParams>,
) -> Result<CallToolResult, McpError> {
    report_result(service.delete_tasks(params.tasks).await)
}

/// Create one or more subtasks.
pub async fn handle_create_subtasks<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<CreateSubtasksParams>,
) -> Result<CallToolResult, McpError> {
    report_result(service.create_subtasks(params.subtasks).await)
}
