/// MCP server setup using `rmcp` with stdio transport.
use anyhow::{Context, Result};
use rmcp::{ServiceExt, handler::server::router::Router, transport::io::stdio};
use tracing::info;

use crate::mcp::tools::{ProjectTools, ToolContext};

/// MCP server wrapping the tool context and serving via stdio.
#[derive(Clone)]
pub struct McpServer {
    pub ctx: ToolContext,
}

impl McpServer {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    /// Start the MCP server on stdio transport (blocks until the client disconnects).
    pub async fn start(self) -> Result<()> {
        info!(
            "Starting MCP server on stdio, project root: {}",
            self.ctx.project_root.display()
        );
        let (stdin, stdout) = stdio();

        let tools = ProjectTools::new(self.ctx.clone());
        let router = Router::new(tools.clone()).with_tools(tools.tool_router.clone());

        router
            .serve((stdin, stdout))
            .await
            .context("MCP server encountered an error during stdio transport")?;

        Ok(())
    }
}
