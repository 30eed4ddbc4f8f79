//! Project tools.

use crate::mcp::params::{CreateProjectParams, DeleteProjectsParams, ProjectIdParams};
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use tick_mcp_app::TaskService;
use tick_mcp_client::TaskStore;

use super::common::{json_result, map_service_error};

/// List every project.
pub async fn handle_get_all_projects<S: TaskStore>(
    service: &TaskService<S>,
) -> Result<CallToolResult, McpError> {
    let projects = service
        .get_all_projects()
        .await
        .map_err(|err| map_service_error(&err))?;
    json_result(&projects)
}

/// Fetch a project together with its open tasks.
pub async fn handle_get_project_info<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<ProjectIdParams>,
) -> Result<CallToolResult, McpError> {
    let data = service
        .get_project_info(&params.project_id)
        .await
        .map_err(|err| map_service_error(&err))?;
    json_result(&data)
}

/// Create a project.
pub async fn handle_create_project<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<CreateProjectParams>,
) -> Result<CallToolResult, McpError> {
    let CreateProjectParams {
        name,
        color,
        view_mode,
    } = params;
    let project = service
        .create_project(&name, color, view_mode)
        .await
        .map_err(|err| map_service_error(&err))?;
    json_result(&project)
}

/// Delete one or more projects.
pub async fn handle_delete_projects<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<DeleteProjectsParams>,
) -> Result<CallToolResult, McpError> {
    let report = service
        .delete_projects(params.projects)
        .await
        .map_err(|err| map_service_error(&err))?;
    json_result(&report)
}
