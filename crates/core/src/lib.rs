//! # Eva Core
//!
//! Domain types, traits, and error definitions for the Eva assistant
//! runtime. This crate has **zero framework dependencies**; it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The completion API and the tool set are defined as traits here.
//! Implementations live in their respective crates. This enables:
//! - Swapping providers via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{AgentError, Error, MemoryError, ProviderError, Result, ToolError};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
