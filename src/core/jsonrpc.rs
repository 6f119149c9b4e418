//! JSON-RPC 2.0 Dispatcher
//!
//! Implements the MCP methods served on `POST /` (and over stdio):
//! `initialize`, `ping`, `tools/list` and `tools/call`. Every response echoes
//! the request `id` verbatim (`null` when absent) and carries exactly one of
//! `result` or `error`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;

use super::server::ServerContext;
use super::shaper;
use super::tool::ToolError;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 response envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// Request ID copied from the request, `null` if the request had none
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Dispatch a raw request body.
///
/// Bodies that are not valid JSON produce a parse error with a `null` id,
/// since the id cannot be known.
pub async fn dispatch(ctx: &ServerContext, body: &[u8], cancel: &CancellationToken) -> JsonRpcResponse {
    match serde_json::from_slice::<Value>(body) {
        Ok(payload) => dispatch_value(ctx, payload, cancel).await,
        Err(err) => {
            tracing::debug!(error = %err, "unparseable JSON-RPC body");
            JsonRpcResponse::error(Value::Null, PARSE_ERROR, "Parse error")
        }
    }
}

/// Dispatch an already-parsed request.
pub async fn dispatch_value(
    ctx: &ServerContext,
    payload: Value,
    cancel: &CancellationToken,
) -> JsonRpcResponse {
    let Value::Object(request) = payload else {
        return JsonRpcResponse::error(Value::Null, INVALID_REQUEST, "Invalid request");
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);

    let Some(method) = request.get("method").and_then(Value::as_str) else {
        return JsonRpcResponse::error(id, INVALID_REQUEST, "Missing method");
    };

    match method {
        "initialize" => JsonRpcResponse::success(id, initialize_result(ctx)),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(id, tools_list_result(ctx)),
        "tools/call" => handle_tools_call(ctx, id, request.get("params"), cancel).await,
        _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method '{method}' not found")),
    }
}

/// True for one-way messages (no `id`, `notifications/*` method) that must
/// not be answered on a streaming transport.
pub fn is_notification(payload: &Value) -> bool {
    let Some(request) = payload.as_object() else {
        return false;
    };
    !request.contains_key("id")
        && request
            .get("method")
            .and_then(Value::as_str)
            .is_some_and(|method| method.starts_with("notifications/"))
}

fn initialize_result(ctx: &ServerContext) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "serverInfo": {
            "name": ctx.server_name,
            "version": ctx.server_version
        },
        "capabilities": {
            "tools": {
                "list": {},
                "call": {}
            }
        }
    })
}

fn tools_list_result(ctx: &ServerContext) -> Value {
    let tools: Vec<Value> = ctx
        .registry
        .list()
        .iter()
        .map(|definition| definition.to_json())
        .collect();
    json!({ "tools": tools })
}

/// Handle MCP tools/call.
///
/// The tool is named by `params.name` (falling back to `params.tool`) and its
/// input comes from `params.arguments` (falling back to `params.input`).
async fn handle_tools_call(
    ctx: &ServerContext,
    id: Value,
    params: Option<&Value>,
    cancel: &CancellationToken,
) -> JsonRpcResponse {
    let params = params.and_then(Value::as_object);

    let tool_name = params.and_then(|p| {
        p.get("name")
            .and_then(Value::as_str)
            .or_else(|| p.get("tool").and_then(Value::as_str))
    });
    let tool_name = match tool_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return JsonRpcResponse::error(id, INVALID_PARAMS, "Tool name is required."),
    };

    let Some(tool) = ctx.registry.get(tool_name) else {
        return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Tool '{tool_name}' not found."));
    };

    let arguments: Option<Map<String, Value>> = params.and_then(|p| {
        p.get("arguments")
            .and_then(Value::as_object)
            .or_else(|| p.get("input").and_then(Value::as_object))
            .cloned()
    });

    let name = tool.definition().name();
    match tool.execute(arguments, cancel).await {
        Ok(result) => {
            let content = shaper::content_items(&result);
            JsonRpcResponse::success(id, json!({ "tool": name, "content": content }))
        }
        Err(err) => {
            log_execution_failure(name, &err);
            JsonRpcResponse::error(id, INTERNAL_ERROR, "Tool execution failed.")
        }
    }
}

/// Log a failed execution. Shared with the REST dispatcher.
pub(crate) fn log_execution_failure(tool: &str, err: &ToolError) {
    match err {
        ToolError::Cancelled => tracing::warn!(tool = %tool, "tool execution cancelled"),
        err => tracing::error!(tool = %tool, error = %err, "error while executing tool"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_omits_result() {
        let response = JsonRpcResponse::error(json!(7), METHOD_NOT_FOUND, "nope");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({ "jsonrpc": "2.0", "id": 7, "error": { "code": -32601, "message": "nope" } })
        );
    }

    #[test]
    fn success_envelope_keeps_null_id() {
        let response = JsonRpcResponse::success(Value::Null, json!({}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "jsonrpc": "2.0", "id": null, "result": {} }));
    }

    #[test]
    fn notifications_are_detected() {
        assert!(is_notification(
            &json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })
        ));
        assert!(!is_notification(
            &json!({ "jsonrpc": "2.0", "id": 1, "method": "notifications/initialized" })
        ));
        assert!(!is_notification(&json!({ "jsonrpc": "2.0", "method": "ping" })));
        assert!(!is_notification(&json!([1, 2])));
    }
}
