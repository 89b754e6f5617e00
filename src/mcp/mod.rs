//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides an MCP server that exposes one transaction form session as tools for AI
//! agent integration. The server communicates via JSON-RPC over stdio.

/// Checks if the server has been initialized and returns an error if not.
macro_rules! require_init {
    ($self:expr) => {
        if !$self.check_initialized().await {
            return Self::uninitialized();
        }
    };
}

mod mcp_utils;
mod tools;

use crate::form::Form;
use crate::notify::Notifications;
use crate::{classify, Config, Mode};
use anyhow::Context;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{
    CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::ErrorData as McpError;
use rmcp::{tool_handler, ServerHandler, ServiceExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// The txn-sheet MCP server.
///
/// Holds a single `Form` for the lifetime of the connection. Tool calls take the form lock, so
/// they are applied one at a time.
#[derive(Clone)]
pub struct FormServer {
    initialized: Arc<Mutex<bool>>,
    form: Arc<Mutex<Form>>,
    notifications: Arc<Notifications>,
    config: Arc<Config>,
    tool_router: ToolRouter<FormServer>,
}

impl FormServer {
    /// Creates a new FormServer with an empty form that classifies according to `mode`.
    pub fn new(config: Config, mode: Mode) -> crate::Result<Self> {
        let notifications = Arc::new(Notifications::new());
        let form = Form::new(classify::classifier(&config, mode)?, notifications.clone());
        Ok(Self {
            initialized: Arc::new(Mutex::new(false)),
            form: Arc::new(Mutex::new(form)),
            notifications,
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        })
    }

    async fn check_initialized(&self) -> bool {
        *self.initialized.lock().await
    }

    fn uninitialized() -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::error(vec![rmcp::model::Content::text(
            "You have not yet initialized the service. Please call __initialize_service__ first.",
        )]))
    }
}

#[tool_handler]
impl ServerHandler for FormServer {
    /// Returns server information sent to the MCP client during initialization.
    ///
    /// Agents tend to treat `instructions` as optional reading, so the full usage instructions
    /// are returned by the `initialize_service` tool, which must be called first.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "txn-sheet".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(include_str!("docs/INTRO.md").into()),
        }
    }
}

/// Transport type for the MCP server.
#[derive(Debug, Default)]
pub(crate) enum Io {
    #[default]
    Stdio,
    /// Mock transport for testing - holds one end of a duplex channel.
    #[cfg(test)]
    Mock(tokio::io::DuplexStream),
}

/// Runs the MCP server with stdio transport or mock transport. This function starts the MCP server
/// and blocks until the client disconnects or an error occurs.
///
/// # Arguments
/// - `config`: The `Config` object
/// - `mode`: Whether rows are classified by the HTTP service or the built-in keyword rules
/// - `io`: Whether we are using stdio as the transport or using mock io for testing
pub(crate) async fn run_server(config: Config, mode: Mode, io: Io) -> crate::Result<()> {
    let server = FormServer::new(config, mode).context("Unable to create the MCP server")?;
    info!("Starting MCP server...");

    let service = match io {
        Io::Stdio => server
            .serve(stdio())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))?,
        #[cfg(test)]
        Io::Mock(stream) => server
            .serve(stream)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))?,
    };

    info!("MCP server running, waiting for requests...");

    // Wait for the server to complete (client disconnects or error)
    service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))?;

    info!("MCP server shut down");
    Ok(())
}
