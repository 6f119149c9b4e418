//! Hello World Tool
//!
//! Reference tool that returns a greeting. The input may carry an optional
//! `name`; without one the tool greets the world.

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::core::tool::{ExecutionResult, McpTool, ToolDefinition, ToolError, ToolInput};

pub const NAME: &str = "hello_world";

pub struct HelloWorldTool {
    definition: ToolDefinition,
}

impl HelloWorldTool {
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            NAME,
            "Returns a friendly greeting. Provide an optional 'name' field in the input.",
            json!({
                "type": "object",
                "title": "HelloWorldInput",
                "additionalProperties": false,
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Optional name to include in the greeting."
                    }
                }
            }),
        );
        Self { definition }
    }
}

impl Default for HelloWorldTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl McpTool for HelloWorldTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        input: ToolInput,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, ToolError> {
        ToolError::check_cancelled(cancel)?;

        let name = match input.as_ref().and_then(|input| input.get("name")) {
            // Only scalar values are read; structured values are ignored.
            None | Some(Value::Null | Value::Object(_) | Value::Array(_)) => None,
            Some(Value::String(name)) => Some(name.trim()),
            Some(Value::Bool(_) | Value::Number(_)) => {
                return Err(ToolError::InvalidInput(
                    "'name' must be a string".to_string(),
                ));
            }
        };

        let message = match name {
            Some(name) if !name.is_empty() => format!("Hello, {name}!"),
            _ => "Hello, world!".to_string(),
        };

        Ok(ExecutionResult::json(json!({ "message": message })))
    }
}
