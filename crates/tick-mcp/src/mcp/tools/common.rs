//! Shared helpers for MCP tool implementations.

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::json;
use tick_mcp_app::ServiceError;

/// Serialize `value` as the pretty-printed text content of a successful result.
pub fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json_str =
        serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json_str)]))
}

/// Map an invocation-level failure onto an MCP error carrying its kind.
#[must_use]
pub fn map_service_error(err: &ServiceError) -> McpError {
    let kind = err.kind();
    let data = Some(json!({ "kind": kind }));
    if err.is_invalid_input() {
        McpError::invalid_params(err.to_string(), data)
    } else {
        McpError::internal_error(format!("{kind}: {err}"), data)
    }
}
