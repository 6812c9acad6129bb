// system-tests/src/stub.rs
// ============================================================================
// Module: Stub Grafana MCP Server
// Description: Minimal MCP server standing in for the Grafana MCP server.
// Purpose: Let suites observe, server-side, what the harness put on the wire.
// Dependencies: rmcp, serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! The stub advertises two tools: `ping` answers `pong` and proves the
//! session is live end to end, and `get_env` echoes one variable from the
//! server's own process environment so stdio suites can assert which
//! credential variables the harness injected into the subprocess. The same
//! handler serves all three transports; the stdio binary wraps it over
//! stdin/stdout and the HTTP helpers mount it behind axum.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use rmcp::ErrorData;
use rmcp::RoleServer;
use rmcp::handler::server::ServerHandler;
use rmcp::model::CallToolRequestParam;
use rmcp::model::CallToolResult;
use rmcp::model::Content;
use rmcp::model::JsonObject;
use rmcp::model::ListToolsResult;
use rmcp::model::PaginatedRequestParam;
use rmcp::model::ServerCapabilities;
use rmcp::model::ServerInfo;
use rmcp::model::Tool;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tool answering `pong`, for session liveness checks.
pub const PING_TOOL: &str = "ping";

/// Tool echoing one variable from the server's process environment.
pub const GET_ENV_TOOL: &str = "get_env";

// ============================================================================
// SECTION: Tool Payloads
// ============================================================================

/// Arguments accepted by the `get_env` tool.
#[derive(Debug, Deserialize)]
pub struct EnvProbeRequest {
    /// Environment variable to read.
    pub name: String,
}

/// Response returned by the `get_env` tool.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvProbeResponse {
    /// Variable that was probed.
    pub name: String,
    /// Its value in the server process, or `None` when unset.
    pub value: Option<String>,
}

// ============================================================================
// SECTION: Server Handler
// ============================================================================

/// Stub MCP server exposing the `ping` and `get_env` tools.
#[derive(Debug, Clone, Default)]
pub struct StubGrafanaServer;

impl StubGrafanaServer {
    /// Creates the stub handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ServerHandler for StubGrafanaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: vec![ping_tool(), get_env_tool()],
            ..Default::default()
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        std::future::ready(dispatch_tool(&request.name, request.arguments))
    }
}

/// Routes one tool call to its implementation.
fn dispatch_tool(
    name: &str,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, ErrorData> {
    tracing::debug!(tool = name, "stub tool call");
    match name {
        PING_TOOL => Ok(CallToolResult::success(vec![Content::text("pong")])),
        GET_ENV_TOOL => {
            let request = parse_env_probe(arguments)?;
            let response = EnvProbeResponse {
                value: std::env::var(&request.name).ok(),
                name: request.name,
            };
            let text = serde_json::to_string(&response).map_err(|error| {
                ErrorData::internal_error(format!("failed to serialize probe: {error}"), None)
            })?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        other => Err(ErrorData::invalid_params(
            format!("tool '{other}' not found"),
            Some(serde_json::json!({ "available_tools": [PING_TOOL, GET_ENV_TOOL] })),
        )),
    }
}

/// Parses the `get_env` arguments object.
fn parse_env_probe(arguments: Option<JsonObject>) -> Result<EnvProbeRequest, ErrorData> {
    let arguments = arguments
        .ok_or_else(|| ErrorData::invalid_params("get_env requires a name argument", None))?;
    serde_json::from_value(Value::Object(arguments))
        .map_err(|error| ErrorData::invalid_params(format!("invalid get_env input: {error}"), None))
}

// ============================================================================
// SECTION: Tool Definitions
// ============================================================================

/// Definition of the `ping` tool.
fn ping_tool() -> Tool {
    Tool {
        name: PING_TOOL.into(),
        title: None,
        description: Some("Answers pong; proves the session is live.".into()),
        input_schema: empty_object_schema(),
        output_schema: None,
        annotations: None,
        icons: None,
    }
}

/// Definition of the `get_env` tool.
fn get_env_tool() -> Tool {
    Tool {
        name: GET_ENV_TOOL.into(),
        title: None,
        description: Some("Echoes one variable from the server process environment.".into()),
        input_schema: env_probe_input_schema(),
        output_schema: None,
        annotations: None,
        icons: None,
    }
}

/// Schema accepting an empty arguments object.
fn empty_object_schema() -> Arc<JsonObject> {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    Arc::new(schema)
}

/// Schema for the `get_env` arguments.
fn env_probe_input_schema() -> Arc<JsonObject> {
    let mut name = JsonObject::new();
    name.insert("type".to_string(), Value::String("string".to_string()));
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), Value::Object(name));
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert(
        "required".to_string(),
        Value::Array(vec![Value::String("name".to_string())]),
    );
    Arc::new(schema)
}

// ============================================================================
// SECTION: Response Helpers
// ============================================================================

/// Returns the first text block of a tool result, if any.
#[must_use]
pub fn first_text(result: &CallToolResult) -> Option<&str> {
    result.content.first().and_then(|content| content.as_text()).map(|text| text.text.as_str())
}
