//! Tool Capability Contract
//!
//! Every tool exposed by the bridge implements [`McpTool`]: a definition that is
//! fixed for the tool's lifetime plus an async execute operation. Execution
//! receives the caller's input object (if any) and a cancellation token that is
//! cancelled when the client disconnects or the server shuts down.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

/// Content type for structured JSON payloads.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Content type for plain text payloads.
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Input object handed to a tool. `None` when the caller supplied no input.
pub type ToolInput = Option<Map<String, Value>>;

/// MCP tool definition.
///
/// Each tool has a name, a human-readable description, and a JSON schema
/// describing its input. The schema is advisory: it is shown to clients and
/// never enforced by the dispatchers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Wire representation used by `tools/list`.
    ///
    /// A missing (null) schema is rendered as an empty object so clients that
    /// expect `inputSchema` to be an object keep working.
    pub fn to_json(&self) -> Value {
        let schema = match &self.input_schema {
            Value::Null => Value::Object(Map::new()),
            schema => schema.clone(),
        };
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": schema,
        })
    }
}

/// Raw result of a tool execution.
///
/// `content_type` is a rendering hint for the response shaper
/// (`application/json`, `text/plain`, or anything else).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub payload: Value,
}

impl ExecutionResult {
    pub fn new(content_type: impl Into<String>, payload: Value) -> Self {
        Self {
            content_type: content_type.into(),
            payload,
        }
    }

    pub fn json(payload: Value) -> Self {
        Self::new(CONTENT_TYPE_JSON, payload)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(CONTENT_TYPE_TEXT, Value::String(text.into()))
    }
}

/// Errors raised by tool logic.
///
/// The message is only ever logged; clients receive a generic description.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool execution was cancelled")]
    Cancelled,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Fails with [`ToolError::Cancelled`] when cancellation has been requested.
    ///
    /// Tools call this before doing any work, and long-running tools call it
    /// periodically while they work.
    pub fn check_cancelled(cancel: &CancellationToken) -> Result<(), ToolError> {
        if cancel.is_cancelled() {
            Err(ToolError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Capability every registered tool satisfies.
#[async_trait]
pub trait McpTool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    async fn execute(
        &self,
        input: ToolInput,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_json_uses_camel_case_schema_key() {
        let def = ToolDefinition::new("demo", "Demo tool", json!({ "type": "object" }));
        let value = def.to_json();
        assert_eq!(value["name"], "demo");
        assert_eq!(value["description"], "Demo tool");
        assert_eq!(value["inputSchema"], json!({ "type": "object" }));
        assert_eq!(serde_json::to_value(&def).unwrap(), value);
    }

    #[test]
    fn null_schema_renders_as_empty_object() {
        let def = ToolDefinition::new("demo", "Demo tool", Value::Null);
        assert_eq!(def.to_json()["inputSchema"], json!({}));
    }

    #[test]
    fn check_cancelled_reports_requested_cancellation() {
        let token = CancellationToken::new();
        assert!(ToolError::check_cancelled(&token).is_ok());
        token.cancel();
        assert!(matches!(
            ToolError::check_cancelled(&token),
            Err(ToolError::Cancelled)
        ));
    }

    #[test]
    fn serde_errors_convert_into_tool_errors() {
        let err: ToolError = serde_json::from_str::<Value>("{").unwrap_err().into();
        assert!(matches!(err, ToolError::Serialization(_)));
        assert!(err.to_string().starts_with("serialization error"));
    }

    #[test]
    fn text_result_wraps_string_payload() {
        let result = ExecutionResult::text("hi");
        assert_eq!(result.content_type, CONTENT_TYPE_TEXT);
        assert_eq!(result.payload, json!("hi"));
    }
}
