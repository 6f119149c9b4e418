//! Tools Module
//!
//! Built-in tool implementations. Each tool lives in its own module; add new
//! tools to [`all`] so they are registered at startup.

use std::sync::Arc;

use crate::core::tool::McpTool;

pub mod hello_world;

/// Every built-in tool, in registration order.
pub fn all() -> Vec<Arc<dyn McpTool>> {
    let hello_world: Arc<dyn McpTool> = Arc::new(hello_world::HelloWorldTool::new());
    vec![hello_world]
}
