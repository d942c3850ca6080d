//! Context update tool: append a structured entry to the rolling log.

use async_trait::async_trait;
use eva_core::error::ToolError;
use eva_core::tool::{Tool, ToolResult};
use eva_memory::{ContextEntry, MemoryStore};
use std::sync::Arc;
use tracing::info;

pub struct UpdateContextTool {
    store: Arc<MemoryStore>,
}

impl UpdateContextTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for UpdateContextTool {
    fn name(&self) -> &str {
        "update_context"
    }

    fn description(&self) -> &str {
        "Record something worth remembering in your context log: a decision, \
         a commitment, a learning, or anything your future self should know."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Entry label, e.g. Decision, Commitment, Learning"
                },
                "summary": {
                    "type": "string",
                    "description": "One-line summary of the entry"
                },
                "details": {
                    "type": "string",
                    "description": "Full details"
                },
                "followup": {
                    "type": "string",
                    "description": "Optional follow-up action, if any"
                }
            },
            "required": ["category", "summary", "details"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let category = arguments["category"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'category' argument".into()))?;
        let summary = arguments["summary"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'summary' argument".into()))?;
        let details = arguments["details"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'details' argument".into()))?;
        let followup = arguments["followup"].as_str().map(String::from);

        let entry = ContextEntry {
            category: category.to_string(),
            summary: summary.to_string(),
            details: details.to_string(),
            followup,
        };

        match self.store.append_context_entry(&entry).await {
            Ok(()) => {
                info!(category, "Context entry recorded");
                Ok(ToolResult {
                    call_id: String::new(),
                    success: true,
                    output: format!("Context updated: [{category}] {summary}"),
                })
            }
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Failed to update context: {e}"),
            }),
        }
    }
}
