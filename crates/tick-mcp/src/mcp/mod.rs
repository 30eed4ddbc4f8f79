//! MCP server implementation for tick-mcp.

mod params;
mod tools;

pub use params::*;

use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::{ToolCallContext, ToolRouter};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, InitializeResult, ListToolsResult,
    ProtocolVersion, ServerCapabilities,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, tool, tool_router};
use std::sync::Arc;
use tick_mcp_app::TaskService;
use tick_mcp_client::TickTickClient;

const INSTRUCTIONS: &str = "Manage TickTick projects and tasks. Batch tools accept one item or a \
list and report a per-item status, so check `results` for failures. Use `inbox` as the project \
id of the Inbox. Dates are RFC 3339 timestamps or YYYY-MM-DD for all-day dates.";

/// MCP server for tick-mcp.
#[derive(Clone)]
pub struct TickTickServer {
    tool_router: ToolRouter<Self>,
    service: Arc<TaskService<TickTickClient>>,
}

#[tool_router]
impl TickTickServer {
    /// Create a new MCP server instance.
    pub fn new(service: TaskService<TickTickClient>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service: Arc::new(service),
        }
    }

    /// List all projects.
    #[tool(description = "List all projects, including archived ones (`closed: true`)")]
    async fn get_all_projects(&self) -> Result<CallToolResult, McpError> {
        tools::projects::handle_get_all_projects(self.service.as_ref()).await
    }

    /// Fetch a project with its open tasks.
    #[tool(description = "Get a project and its open tasks by project ID; use `inbox` for the Inbox")]
    async fn get_project_info(
        &self,
        params: Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::projects::handle_get_project_info(self.service.as_ref(), params).await
    }

    /// Create a project.
    #[tool(description = "Create a project with a name, optional hex color and view mode (list, kanban, timeline)")]
    async fn create_project(
        &self,
        params: Parameters<CreateProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::projects::handle_create_project(self.service.as_ref(), params).await
    }

    /// Delete projects.
    #[tool(description = "Delete one project ID or a list of project IDs; reports each deletion separately")]
    async fn delete_projects(
        &self,
        params: Parameters<DeleteProjectsParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::projects::handle_delete_projects(self.service.as_ref(), params).await
    }

    /// Create tasks.
    #[tool(
        description = "Create one task or a list of tasks with title, project, content, priority, dates, reminders, recurrence and tags"
    )]
    async fn create_tasks(
        &self,
        params: Parameters<CreateTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::tasks::handle_create_tasks(self.service.as_ref(), params).await
    }

    /// Update tasks.
    #[tool(
        description = "Update one task or a list of tasks; each item needs task_id and project_id and changes only the fields it gives"
    )]
    async fn update_tasks(
        &self,
        params: Parameters<UpdateTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::tasks::handle_update_tasks(self.service.as_ref(), params).await
    }

    /// Complete tasks.
    #[tool(description = "Mark one or more tasks complete, given {project_id, task_id} pairs")]
    async fn complete_tasks(
        &self,
        params: Parameters<TaskRefsParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::tasks::handle_complete_tasks(self.service.as_ref(), params).await
    }

    /// Delete tasks.
    #[tool(description = "Delete one or more tasks, given {project_id, task_id} pairs")]
    async fn delete_tasks(
        &self,
        params: Parameters<TaskRefsParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::tasks::handle_delete_tasks(self.service.as_ref(), params).await
    }

    /// Create subtasks.
    #[tool(description = "Create one or more subtasks under existing parent tasks")]
    async fn create_subtasks(
        &self,
        params: Parameters<CreateSubtasksParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::tasks::handle_create_subtasks(self.service.as_ref(), params).await
    }

    /// Filter open tasks.
    #[tool(
        description = "Find open tasks by task ID, project, priority, due-date window (today, tomorrow, overdue, next_7_days, custom) and search text; all given criteria must match"
    )]
    async fn query_tasks(
        &self,
        params: Parameters<QueryTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::query_tasks::handle_query_tasks(self.service.as_ref(), params).await
    }
}

impl ServerHandler for TickTickServer {
    fn get_info(&self) -> InitializeResult {
        let capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_tool_list_changed()
            .build();

        InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities,
            server_info: Implementation {
                name: "tick-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_context = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_context).await
    }
}
