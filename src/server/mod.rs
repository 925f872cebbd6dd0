//! MCP Server implementation
//!
//! Line-delimited JSON-RPC over stdio: one request per input line, one
//! response per output line. Notifications get no response.

mod handlers;

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpTool, ServerInfo, Tool};
use crate::types::McpResult;

pub use handlers::*;

/// MCP protocol revision announced during `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP Server that handles JSON-RPC communication
pub struct McpServer {
    server_info: ServerInfo,
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl McpServer {
    pub fn new() -> Self {
        Self::with_info(ServerInfo::default())
    }

    pub fn with_info(info: ServerInfo) -> Self {
        Self {
            server_info: info,
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool with the server
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) -> &mut Self {
        let name = tool.name();
        self.tools.insert(name, tool);
        self
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Serve stdin/stdout until stdin closes (blocking)
    pub fn run(&self) -> McpResult<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve requests read from `reader`, writing responses to `writer`
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> McpResult<()> {
        info!(
            name = %self.server_info.name,
            tools = self.tools.len(),
            "server ready"
        );

        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                if let Some(response) = self.handle_message(trimmed)? {
                    writeln!(writer, "{}", response)?;
                    writer.flush()?;
                }
            }
            line.clear();
        }

        info!("input closed, server stopping");
        Ok(())
    }

    /// Handle one raw JSON-RPC message, returning the serialized response
    pub fn handle_message(&self, raw: &str) -> McpResult<Option<String>> {
        let request: JsonRpcRequest = match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable request");
                return Ok(Some(to_line(&JsonRpcError::parse_error(e.to_string()))?));
            }
        };

        let id = request.id.clone().unwrap_or(Value::Null);
        if !request.is_valid() {
            return Ok(Some(to_line(&JsonRpcError::invalid_request(
                id,
                "jsonrpc must be '2.0'",
            ))?));
        }

        debug!(method = %request.method, "request");
        let is_notification = request.is_notification();
        let response = match request.method.as_str() {
            "initialize" => success(id, self.initialize_result()),
            "notifications/initialized" => return Ok(None),
            "tools/list" => success(id, self.tools_list_result()),
            "tools/call" => self.handle_tool_call(id, request.params),
            "ping" => success(id, json!({})),
            _ if is_notification => return Ok(None),
            method => to_line(&JsonRpcError::method_not_found(id, method)),
        }?;

        Ok(Some(response))
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.server_info.name,
                "version": self.server_info.version
            }
        })
    }

    fn tools_list_result(&self) -> Value {
        let tools: Vec<McpTool> = self.tools.values().map(|t| t.definition()).collect();
        json!({ "tools": tools })
    }

    fn handle_tool_call(&self, id: Value, params: Option<Value>) -> McpResult<String> {
        let Some(params) = params else {
            return to_line(&JsonRpcError::invalid_params(id, "missing parameters"));
        };
        let Some(tool_name) = extract_tool_name(&params) else {
            return to_line(&JsonRpcError::invalid_params(id, "missing tool name"));
        };
        let Some(tool) = self.tools.get(tool_name) else {
            return to_line(&JsonRpcError::unknown_tool(id, tool_name));
        };

        match tool.execute(extract_arguments(&params)) {
            Ok(result) => success(id, result),
            Err(e) => {
                warn!(tool = tool_name, error = %e, "tool failed");
                to_line(&JsonRpcError::tool_error(id, e.to_string()))
            }
        }
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_line<T: Serialize>(response: &T) -> McpResult<String> {
    Ok(serde_json::to_string(response)?)
}

fn success(id: Value, result: Value) -> McpResult<String> {
    to_line(&JsonRpcResponse::new(id, result))
}
