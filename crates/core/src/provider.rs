//! Provider trait: the abstraction over the completion API.
//!
//! A Provider sends a conversation (plus system instructions and tool
//! schemas) to a hosted language model and returns a normalized response.
//! Vendor-specific wire shapes are decoded once at this boundary; the agent
//! loop only ever sees `ProviderResponse`.
//!
//! Implementations: Anthropic Messages API, OpenAI-compatible chat
//! completions.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A request to the completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "claude-sonnet-4-20250514", "gpt-4o")
    pub model: String,

    /// The conversation messages, system turn included
    pub messages: Vec<Message>,

    /// Maximum-output-token ceiling
    pub max_tokens: u32,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A normalized response from a provider.
///
/// `message.content` is the concatenation of the response's plain-text
/// segments (no separator inserted); `message.tool_calls` holds every
/// tool-call segment in the order the model listed them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated assistant message
    pub message: Message,

    /// Token usage statistics, when the vendor reports them
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information. Observability only; never gates anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The agent loop calls `complete()` without knowing which vendor is behind
/// it. The active provider is selected statically from configuration; there
/// is no failover.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "anthropic", "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;
}
