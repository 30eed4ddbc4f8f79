//! Query tasks tool implementation.

use crate::mcp::params::QueryTasksParams;
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use tick_mcp_app::{TaskQuery, TaskService};
use tick_mcp_client::TaskStore;

use super::common::{json_result, map_service_error};

impl QueryTasksParams {
    pub(crate) fn into_query(self) -> TaskQuery {
        let Self {
            task_id,
            project_id,
            priority,
            date_filter,
            custom_days,
            search_term,
            timezone,
        } = self;
        TaskQuery {
            task_id,
            project_id,
            priority,
            date_filter,
            custom_days,
            search_term,
            timezone,
        }
    }
}

/// Filter open tasks across projects.
pub async fn handle_query_tasks<S: TaskStore>(
    service: &TaskService<S>,
    Parameters(params): Parameters<QueryTasksParams>,
) -> Result<CallToolResult, McpError> {
    let result = service
        .query_tasks(params.into_query())
        .await
        .map_err(|err| map_service_error(&err))?;
    json_result(&result)
}
