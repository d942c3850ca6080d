//! Completion API adapters for Eva.
//!
//! One adapter per vendor, all behind the `Provider` trait from `eva-core`.
//! The active adapter is chosen once from configuration.

pub mod anthropic;
pub mod openai_compat;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_provider;
