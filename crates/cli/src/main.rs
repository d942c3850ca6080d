//! Eva CLI entry point.
//!
//! Commands:
//! - `agent`: send a message through the reasoning loop
//! - `gateway`: start the HTTP webhook server
//! - `workflow`: run one scheduled workflow now

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eva", about = "Eva, a private personal assistant", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to Eva and print her reply
    Agent {
        /// The message to send
        message: String,

        /// Override the memory directory
        #[arg(long)]
        memory_dir: Option<std::path::PathBuf>,
    },

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one workflow immediately (heartbeat, morning_brief, weekly_review)
    Workflow {
        /// Which workflow to run
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Agent { message, memory_dir } => commands::agent::run(message, memory_dir).await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Workflow { name } => commands::workflow::run(name).await?,
    }

    Ok(())
}
