//! Memory read tool: fetch one of the five memory documents on demand.

use async_trait::async_trait;
use eva_core::error::{MemoryError, ToolError};
use eva_core::tool::{Tool, ToolResult};
use eva_memory::{DOCUMENT_NAMES, MemoryStore};
use std::sync::Arc;

pub struct ReadMemoryTool {
    store: Arc<MemoryStore>,
}

impl ReadMemoryTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ReadMemoryTool {
    fn name(&self) -> &str {
        "read_memory"
    }

    fn description(&self) -> &str {
        "Read one of your memory documents in full. Use this when you need \
         more detail than the excerpts in your system prompt."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "enum": DOCUMENT_NAMES,
                    "description": "Which memory document to read"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let document = arguments["name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name' argument".into()))?;

        match self.store.load_document(document).await {
            Ok(content) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: content,
            }),
            // A missing document is conversational data for the model, not a
            // fault in the loop.
            Err(e @ MemoryError::DocumentNotFound(_)) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: e.to_string(),
            }),
            Err(e) => Err(ToolError::ExecutionFailed {
                tool_name: "read_memory".into(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_docs() -> (TempDir, Arc<MemoryStore>) {
        let dir = TempDir::new().unwrap();
        for name in DOCUMENT_NAMES {
            std::fs::write(dir.path().join(format!("{name}.md")), format!("{name} body")).unwrap();
        }
        let store = Arc::new(MemoryStore::new(dir.path()));
        (dir, store)
    }

    #[tokio::test]
    async fn reads_named_document() {
        let (_dir, store) = store_with_docs();
        let tool = ReadMemoryTool::new(store);

        let result = tool
            .execute(serde_json::json!({"name": "telos"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "telos body");
    }

    #[tokio::test]
    async fn missing_document_is_reported_in_band() {
        let dir = TempDir::new().unwrap();
        let tool = ReadMemoryTool::new(Arc::new(MemoryStore::new(dir.path())));

        let result = tool
            .execute(serde_json::json!({"name": "soul"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("soul"));
    }

    #[tokio::test]
    async fn missing_argument_is_invalid() {
        let (_dir, store) = store_with_docs();
        let tool = ReadMemoryTool::new(store);

        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn schema_enumerates_the_five_documents() {
        let dir = TempDir::new().unwrap();
        let tool = ReadMemoryTool::new(Arc::new(MemoryStore::new(dir.path())));

        let schema = tool.parameters_schema();
        let names: Vec<&str> = schema["properties"]["name"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(names, DOCUMENT_NAMES);
        assert_eq!(schema["required"], serde_json::json!(["name"]));
    }
}
