//! Tool Registry
//!
//! Name-keyed collection of tools. Names are compared case-insensitively and
//! the last registration under a name wins. The map itself is an immutable
//! snapshot: readers clone the current `Arc` and release the lock immediately,
//! while `upsert` rebuilds the map and swaps the snapshot in.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::tool::{McpTool, ToolDefinition};

type ToolMap = HashMap<String, Arc<dyn McpTool>>;

/// Registry of available MCP tools.
pub struct ToolRegistry {
    tools: RwLock<Arc<ToolMap>>,
}

/// Case folding used for registry keys.
fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Ordering key for `list`: ordinal comparison after upper-case folding, so
/// `_` (0x5F) sorts after every letter.
fn sort_key(name: &str) -> String {
    name.to_uppercase()
}

impl ToolRegistry {
    /// Build a registry from a set of tools, upserting each by name.
    pub fn new<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn McpTool>>,
    {
        let mut map = ToolMap::new();
        for tool in tools {
            map.insert(fold(tool.definition().name()), tool);
        }
        Self {
            tools: RwLock::new(Arc::new(map)),
        }
    }

    fn snapshot(&self) -> Arc<ToolMap> {
        // The snapshot is never left half-written, so a poisoned lock still
        // guards a consistent map.
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register a tool, replacing any tool whose name matches case-insensitively.
    pub fn upsert(&self, tool: Arc<dyn McpTool>) {
        let mut guard = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        let mut map = ToolMap::clone(&guard);
        map.insert(fold(tool.definition().name()), tool);
        *guard = Arc::new(map);
    }

    /// All tool definitions ordered by case-insensitive name.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let snapshot = self.snapshot();
        let mut definitions: Vec<ToolDefinition> = snapshot
            .values()
            .map(|tool| tool.definition().clone())
            .collect();
        definitions.sort_by_cached_key(|def| sort_key(def.name()));
        definitions
    }

    /// Look up a tool by name. Blank names are never registered and report
    /// not-found.
    pub fn get(&self, name: &str) -> Option<Arc<dyn McpTool>> {
        if name.trim().is_empty() {
            return None;
        }
        self.snapshot().get(&fold(name)).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tool::{ExecutionResult, ToolError, ToolInput};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    struct StaticTool {
        definition: ToolDefinition,
        marker: &'static str,
    }

    #[async_trait]
    impl McpTool for StaticTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(
            &self,
            _input: ToolInput,
            _cancel: &CancellationToken,
        ) -> Result<ExecutionResult, ToolError> {
            Ok(ExecutionResult::text(self.marker))
        }
    }

    fn tool(name: &str, marker: &'static str) -> Arc<dyn McpTool> {
        Arc::new(StaticTool {
            definition: ToolDefinition::new(name, "test tool", json!({ "type": "object" })),
            marker,
        })
    }

    fn names(registry: &ToolRegistry) -> Vec<String> {
        registry
            .list()
            .iter()
            .map(|def| def.name().to_string())
            .collect()
    }

    #[test]
    fn list_is_sorted_case_insensitively() {
        let registry = ToolRegistry::new([
            tool("zeta", "z"),
            tool("Alpha", "a"),
            tool("beta", "b"),
            tool("Gamma", "g"),
        ]);
        assert_eq!(names(&registry), vec!["Alpha", "beta", "Gamma", "zeta"]);
    }

    #[test]
    fn underscore_sorts_after_letters() {
        let registry = ToolRegistry::new([
            tool("hello_world", "a"),
            tool("helloWorld", "b"),
            tool("hello", "c"),
        ]);
        assert_eq!(names(&registry), vec!["hello", "helloWorld", "hello_world"]);
    }

    #[test]
    fn names_differing_by_case_keep_last_registration() {
        let registry = ToolRegistry::new([tool("Echo", "first"), tool("ECHO", "second")]);
        assert_eq!(registry.len(), 1);
        assert_eq!(names(&registry), vec!["ECHO"]);
    }

    #[tokio::test]
    async fn lookup_ignores_case() {
        let registry = ToolRegistry::new([tool("hello_world", "hi")]);
        let found = registry.get("HELLO_World").expect("tool should resolve");
        let result = found
            .execute(None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.payload, json!("hi"));
    }

    #[test]
    fn blank_names_are_not_found() {
        let registry = ToolRegistry::new([tool("hello_world", "hi")]);
        assert!(registry.get("").is_none());
        assert!(registry.get("   ").is_none());
        assert!(registry.get("\t\n").is_none());
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_tool() {
        let registry = ToolRegistry::new([tool("echo", "old")]);
        registry.upsert(tool("Echo", "new"));
        registry.upsert(tool("other", "x"));

        assert_eq!(registry.len(), 2);
        let result = registry
            .get("echo")
            .unwrap()
            .execute(None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.payload, json!("new"));
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let registry = Arc::new(ToolRegistry::new([tool("base", "b")]));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let name = format!("tool_{i}");
                    registry.upsert(tool(&name, "t"));
                    assert!(registry.get("base").is_some());
                    assert!(registry.get(&name).is_some());
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 9);
        let listed = names(&registry);
        let mut sorted = listed.clone();
        sorted.sort_by_key(|name| name.to_uppercase());
        assert_eq!(listed, sorted);
    }
}
