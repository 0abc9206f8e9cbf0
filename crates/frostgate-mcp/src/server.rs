//! MCP server implementation.
//!
//! Line-delimited JSON-RPC over stdio (or any async reader/writer pair),
//! exposing the three object tools and, when enabled, the gated statement
//! tool.

use std::sync::Arc;

use frostgate_core::FrostgateConfig;
use frostgate_sql::{PermissionGate, PermissionTable, StatementClassifier};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::channel::ExecutionChannel;
use crate::error::{ObjectError, ServerError};
use crate::factory::{ObjectTools, TOOL_NAMES};
use crate::protocol::*;
use crate::statement::{EXECUTE_STATEMENT, StatementTool};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// The MCP server.
pub struct ObjectServer {
    name: String,
    tools: ObjectTools,
    statement_tool: Option<StatementTool>,
}

impl ObjectServer {
    /// Create a server exposing only the object tools.
    pub fn new(tools: ObjectTools) -> Self {
        Self {
            name: "frostgate".to_string(),
            tools,
            statement_tool: None,
        }
    }

    /// Build everything from configuration around the caller's channel.
    pub fn from_config(
        config: &FrostgateConfig,
        channel: Arc<dyn ExecutionChannel>,
    ) -> Result<Self, ObjectError> {
        let tools = ObjectTools::from_config(config, channel.clone())?;
        let mut server = Self::new(tools).with_name(config.server.name.clone());

        if config.server.execute_statement_tool {
            let table = PermissionTable::from_config(&config.statement_permissions)?;
            let gate = PermissionGate::new(StatementClassifier::new(config.sql.dialect), table);
            server = server.with_statement_tool(StatementTool::new(
                gate,
                channel,
                config.listing.max_limit,
            ));
        }
        Ok(server)
    }

    /// Set the name reported on `initialize`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Expose the gated `execute_statement` tool.
    pub fn with_statement_tool(mut self, tool: StatementTool) -> Self {
        self.statement_tool = Some(tool);
        self
    }

    pub fn tools(&self) -> &ObjectTools {
        &self.tools
    }

    /// All tool definitions this server lists.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions = self.tools.tool_definitions();
        if let Some(tool) = &self.statement_tool {
            definitions.push(tool.definition());
        }
        definitions
    }

    /// Run the server with stdio transport.
    pub async fn run_stdio(&self) -> Result<(), ServerError> {
        tracing::info!(server = %self.name, "Starting MCP server with stdio transport");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve requests from `reader` until it is exhausted.
    ///
    /// One request per line. Notifications (requests without an id) get no
    /// response.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) if request.id.is_none() => {
                    tracing::debug!(method = %request.method, "Notification received");
                    continue;
                }
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Unparseable request");
                    JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {}", e))
                }
            };

            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": self.name,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.tool_definitions(),
        };
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, codes::INTERNAL_ERROR, format!("Internal error: {}", e)),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        codes::INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                    );
                }
            },
            None => return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing params"),
        };

        let result = if TOOL_NAMES.contains(&params.name.as_str()) {
            self.tools
                .call(&params.name, &params.arguments, &params.options)
                .await
        } else {
            match (&self.statement_tool, params.name.as_str()) {
                (Some(tool), EXECUTE_STATEMENT) => {
                    tool.call(&params.arguments, &params.options).await
                }
                _ => {
                    return JsonRpcResponse::error(
                        id,
                        codes::INVALID_PARAMS,
                        format!("Tool not found: {}", params.name),
                    );
                }
            }
        };

        match serde_json::to_value(result) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, codes::INTERNAL_ERROR, format!("Internal error: {}", e)),
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}
