//! MCP server surface over the tool catalog.

use openapi_mcp_tools::error::ToolsetError;
use openapi_mcp_tools::runtime::ToolCatalog;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use std::sync::Arc;

/// Serves one immutable [`ToolCatalog`] for the lifetime of the process.
#[derive(Clone)]
pub struct ApiServer {
    catalog: Arc<ToolCatalog>,
}

impl ApiServer {
    #[must_use]
    pub fn new(catalog: Arc<ToolCatalog>) -> Self {
        Self { catalog }
    }
}

impl ServerHandler for ApiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.catalog.title().to_string(),
                version: self.catalog.version().to_string(),
                ..Default::default()
            },
            instructions: None,
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.catalog.list_tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        self.catalog
            .call_tool(&request.name, &arguments)
            .await
            .map_err(map_error)
    }
}

fn map_error(error: ToolsetError) -> ErrorData {
    match error {
        ToolsetError::Runtime(message) => ErrorData::invalid_params(message, None),
        other => ErrorData::internal_error(other.to_string(), None),
    }
}
