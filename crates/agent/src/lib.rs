//! Eva's reasoning loop.
//!
//! `prompt` assembles the system prompt from the memory documents;
//! `loop_runner` drives the completion/tool cycle for one invocation.

pub mod loop_runner;
pub mod prompt;

pub use loop_runner::AgentLoop;
pub use prompt::build_system_prompt;
