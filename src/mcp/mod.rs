//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides an MCP server that exposes the expense tracker as tools for AI agent
//! integration. The server communicates via JSON-RPC over stdio.

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

use crate::Config;
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

/// The expenses MCP server.
///
/// All clones share one append lock, so the server process is a single writer: appends from
/// concurrent tool calls are applied one after another.
#[derive(Debug, Clone)]
pub struct ExpenseServer {
    initialized: Arc<Mutex<bool>>,
    config: Arc<Config>,
    append_lock: Arc<Mutex<()>>,
    tool_router: ToolRouter<ExpenseServer>,
}

impl ExpenseServer {
    /// Creates a new ExpenseServer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            initialized: Arc::new(Mutex::new(false)),
            config: Arc::new(config),
            append_lock: Arc::new(Mutex::new(())),
            tool_router: Self::tool_router(),
        }
    }

    async fn check_initialized(&self) -> bool {
        *self.initialized.lock().await
    }

    fn uninitialized() -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::error(vec![rmcp::model::Content::text(
            "You have not yet initialized the service. Please call initialize_service first.",
        )]))
    }
}

#[tool_handler]
impl ServerHandler for ExpenseServer {
    /// Returns server information sent to the MCP client during initialization.
    ///
    /// Agents tend to treat `instructions` as optional reading, so the tools also refuse to run
    /// until `initialize_service` has been called, which returns the full usage instructions.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "expenses".into(),
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
pub(crate) async fn run_server(config: Config, io: Io) -> crate::Result<()> {
    use crate::error::{ErrorType, IntoResult};
    let server = ExpenseServer::new(config);
    info!("Starting MCP server...");

    let service = match io {
        Io::Stdio => server
            .serve(stdio())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
        #[cfg(test)]
        Io::Mock(stream) => server
            .serve(stream)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
    };

    info!("MCP server running, waiting for requests...");

    // Wait for the server to complete (client disconnects or error)
    service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))
        .pub_result(ErrorType::Service)?;

    info!("MCP server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use rmcp::model::{CallToolRequestParam, CallToolResult};
    use rmcp::service::{RoleClient, RunningService};
    use serde_json::{json, Map, Value};
    use tokio::io::duplex;

    async fn call(
        client: &RunningService<RoleClient, ()>,
        name: &'static str,
        args: Value,
    ) -> CallToolResult {
        let arguments: Option<Map<String, Value>> = match args {
            Value::Object(map) => Some(map),
            _ => None,
        };
        client
            .call_tool(CallToolRequestParam {
                name: name.into(),
                arguments,
            })
            .await
            .unwrap_or_else(|e| panic!("{name} call failed: {e}"))
    }

    fn is_error(result: &CallToolResult) -> bool {
        result.is_error.unwrap_or(false)
    }

    /// Integration test for the MCP server using an in-memory transport.
    #[tokio::test]
    async fn test_mcp_server_integration() {
        // Create duplex channel - one end for server, one for client
        let (client_io, server_io) = duplex(4096);

        // Create test environment (holds TempDir alive for duration of test)
        let env = TestEnv::new().await;
        let config = env.config();

        // Spawn server in background task
        let server_handle =
            tokio::spawn(async move { run_server(config, Io::Mock(server_io)).await });

        // Create MCP client connected to the other end
        let client = ().serve(client_io).await.expect("Failed to create client");

        // Tools refuse to run before initialize_service
        let early = call(&client, "dashboard", json!({})).await;
        assert!(is_error(&early), "dashboard ran before initialization");

        let init = call(&client, "initialize_service", Value::Null).await;
        assert!(!is_error(&init), "initialize_service: {:?}", init.content);

        let empty = call(&client, "dashboard", json!({})).await;
        assert!(!is_error(&empty), "dashboard: {:?}", empty.content);

        let expense = call(
            &client,
            "add_expense",
            json!({
                "category": "Groceries",
                "description": "milk",
                "amount": 10,
                "date": "2024-01-15"
            }),
        )
        .await;
        assert!(!is_error(&expense), "add_expense: {:?}", expense.content);

        let income = call(
            &client,
            "add_income",
            json!({ "category": "Paycheck", "amount": "2000.00", "date": "2024-01-20" }),
        )
        .await;
        assert!(!is_error(&income), "add_income: {:?}", income.content);

        // A rejected entry is an error result and writes nothing
        let rejected = call(
            &client,
            "add_expense",
            json!({ "category": "Groceries", "description": "milk", "amount": 0 }),
        )
        .await;
        assert!(is_error(&rejected), "a zero amount was accepted");

        let unknown = call(
            &client,
            "add_income",
            json!({ "category": "Lottery", "amount": 5 }),
        )
        .await;
        assert!(is_error(&unknown), "an unknown category was accepted");

        let csv = env.worksheet().await;
        assert_eq!(csv.lines().count(), 3, "{csv}");

        for (name, args) in [
            ("dashboard", json!({ "today": "2024-02-01" })),
            ("report_breakdown", json!({ "year": 2024 })),
            ("report_trend", json!({ "category": "Groceries", "all_years": true })),
            ("report_totals", Value::Null),
            ("list_categories", Value::Null),
        ] {
            let result = call(&client, name, args).await;
            assert!(!is_error(&result), "{name}: {:?}", result.content);
        }

        // Drop client to trigger server shutdown
        drop(client);

        // Wait for server to finish (with timeout)
        let server_result = tokio::time::timeout(std::time::Duration::from_secs(5), server_handle)
            .await
            .expect("Server timed out")
            .expect("Server task panicked");

        assert!(
            server_result.is_ok(),
            "Server returned error: {:?}",
            server_result
        );
    }

    #[tokio::test]
    async fn test_mcp_tools_are_listed() {
        let (client_io, server_io) = duplex(4096);
        let env = TestEnv::new().await;
        let config = env.config();
        let _server_handle =
            tokio::spawn(async move { run_server(config, Io::Mock(server_io)).await });
        let client = ().serve(client_io).await.expect("Failed to create client");

        let tools = client
            .list_tools(Default::default())
            .await
            .expect("Failed to list tools");
        let mut names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "add_expense",
                "add_income",
                "dashboard",
                "initialize_service",
                "list_categories",
                "report_breakdown",
                "report_totals",
                "report_trend",
            ]
        );
    }
}
