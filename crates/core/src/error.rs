//! Error types for the Eva domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; only tool-internal failures
//! are recoverable (they are reported back to the model in-band), everything
//! else aborts the invocation that raised it.

use thiserror::Error;

/// The top-level error type for all Eva operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Agent loop errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the completion API. None of these are retried by the
/// agent loop; they propagate to the caller of the invocation.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    /// A required memory document is absent. Loading is all-or-nothing, so
    /// this is fatal for the whole invocation.
    #[error("Memory document not found: {0}")]
    DocumentNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    /// The model requested a capability outside the fixed registry.
    /// An integration fault, never swallowed.
    #[error("Unknown tool: {0}")]
    Unknown(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum AgentError {
    /// The loop exceeded its iteration budget without the model producing a
    /// terminal text response.
    #[error("Tool-call loop exceeded its budget of {max_iterations} iterations")]
    LoopBudgetExceeded { max_iterations: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn missing_document_names_the_document() {
        let err = Error::Memory(MemoryError::DocumentNotFound("telos".into()));
        assert!(err.to_string().contains("telos"));
    }

    #[test]
    fn unknown_tool_is_distinguishable() {
        let err = ToolError::Unknown("send_rocket".into());
        assert!(err.to_string().contains("Unknown tool"));
        assert!(matches!(err, ToolError::Unknown(_)));
    }

    #[test]
    fn loop_budget_reports_limit() {
        let err = AgentError::LoopBudgetExceeded { max_iterations: 10 };
        assert!(err.to_string().contains("10"));
    }
}
