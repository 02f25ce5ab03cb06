use std::sync::Arc;

use rmcp::model::*;
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ServerHandler;

use crate::config::ServerConfig;
use crate::credential::EnvSource;
use crate::dispatcher::ToolDispatcher;
use crate::github::GithubConnector;

/// MCP front end. Tool calls are handed to the [`ToolDispatcher`], which always produces a
/// result, so `call_tool` never returns a protocol error.
#[derive(Clone)]
pub struct TerragruntMcpServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl TerragruntMcpServer {
    pub fn new(
        config: ServerConfig,
        env: Arc<dyn EnvSource>,
        connector: Arc<dyn GithubConnector>,
    ) -> crate::error::Result<Self> {
        Ok(Self {
            dispatcher: Arc::new(ToolDispatcher::new(config, env, connector)?),
        })
    }
}

impl ServerHandler for TerragruntMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "terragrunt-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Terragrunt documentation and issues server. Use list-doc-categories to see the \
                 documentation categories, list-all-docs-by-category to see the documents in one, \
                 then read-document-from-category for a single document or \
                 read-all-docs-from-category for the whole category. Use get-all-open-issues for \
                 open GitHub issues (set all to true for every page). A GitHub token must be set \
                 in GITHUB_TOKEN, GH_TOKEN, or GITHUB_PERSONAL_ACCESS_TOKEN."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(
            self.dispatcher.registry().list_tools(),
        ))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::debug!(tool = %request.name, "Received tool call");
        Ok(self
            .dispatcher
            .dispatch(&request.name, request.arguments)
            .await)
    }
}
