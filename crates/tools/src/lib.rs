//! Built-in tools for Eva.
//!
//! The assistant's capability surface is deliberately small: it can read its
//! own memory documents and append to its context log. Everything else
//! (email, calendar, messaging) happens in workflows outside the model loop.

pub mod read_memory;
pub mod update_context;

pub use read_memory::ReadMemoryTool;
pub use update_context::UpdateContextTool;

use eva_core::tool::ToolRegistry;
use eva_memory::MemoryStore;
use std::sync::Arc;

/// Create the default tool registry over the given memory store.
pub fn default_registry(store: Arc<MemoryStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ReadMemoryTool::new(store.clone())));
    registry.register(Box::new(UpdateContextTool::new(store)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_registry_exposes_both_tools() {
        let dir = TempDir::new().unwrap();
        let registry = default_registry(Arc::new(MemoryStore::new(dir.path())));

        let mut names = registry.names();
        names.sort();
        assert_eq!(names, vec!["read_memory", "update_context"]);
        assert_eq!(registry.definitions().len(), 2);
    }
}
