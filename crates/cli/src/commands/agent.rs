//! `eva agent`: one message through the reasoning loop.

use eva_agent::AgentLoop;
use eva_config::AppConfig;
use eva_memory::MemoryStore;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(
    message: String,
    memory_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ANTHROPIC_API_KEY = 'sk-ant-...'");
        eprintln!("    OPENAI_API_KEY    = 'sk-...'");
        eprintln!("    EVA_API_KEY       = 'sk-...'   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!(
            "    {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = eva_providers::build_provider(&config)?;

    let store = Arc::new(MemoryStore::new(
        memory_dir.unwrap_or_else(|| config.memory.dir.clone()),
    ));
    let tools = Arc::new(eva_tools::default_registry(store.clone()));

    let agent = AgentLoop::new(
        provider,
        &config.default_model,
        config.default_max_tokens,
        tools,
        store,
    )
    .with_max_iterations(config.agent.max_tool_iterations);

    let reply = agent.run(&message).await?;
    println!("{reply}");
    Ok(())
}
