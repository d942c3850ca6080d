//! `eva workflow`: run one scheduled workflow immediately.

use eva_actions::ActionClient;
use eva_config::AppConfig;
use eva_memory::MemoryStore;
use eva_workflow::{WorkflowContext, WorkflowKind, run_workflow};
use std::sync::Arc;

pub async fn run(name: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let kind: WorkflowKind = name.parse()?;

    let api_key = config
        .actions
        .composio_api_key
        .clone()
        .ok_or("Composio API key not configured (set COMPOSIO_API_KEY)")?;
    let actions = ActionClient::new(api_key, config.actions.composio_base_url.clone())?;

    let ctx = WorkflowContext {
        actions,
        store: Arc::new(MemoryStore::new(config.memory.dir.clone())),
        repo_dir: config.memory.repo_dir.clone(),
        user: config.user.clone(),
    };

    run_workflow(kind, &ctx).await?;
    println!("Workflow {kind} completed");
    Ok(())
}
