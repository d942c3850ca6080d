//! Git synchronization of the memory repository.
//!
//! The memory directory lives in a git repository shared with other
//! machines. Workflows pull before reading and push after writing so
//! context entries survive host failures.

use crate::WorkflowError;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

async fn git(repo_dir: &Path, args: &[&str]) -> Result<std::process::Output, WorkflowError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .await
        .map_err(|e| WorkflowError::Git(format!("Failed to run git {}: {e}", args.join(" "))))?;
    Ok(output)
}

fn ensure_success(output: &std::process::Output, what: &str) -> Result<(), WorkflowError> {
    if output.status.success() {
        Ok(())
    } else {
        Err(WorkflowError::Git(format!(
            "git {what} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// Pull the latest memory state.
pub async fn sync_memory(repo_dir: &Path) -> Result<(), WorkflowError> {
    debug!(repo = %repo_dir.display(), "Syncing memory repository");
    let output = git(repo_dir, &["pull", "--rebase"]).await?;
    ensure_success(&output, "pull --rebase")
}

/// Commit and push context log changes, if any.
pub async fn push_memory(repo_dir: &Path, message: &str) -> Result<(), WorkflowError> {
    let output = git(repo_dir, &["add", "memory/context.md"]).await?;
    ensure_success(&output, "add")?;

    // Exit code 0 means nothing staged; skip the commit
    let diff = git(repo_dir, &["diff", "--cached", "--quiet"]).await?;
    if diff.status.success() {
        debug!("No memory changes to push");
        return Ok(());
    }

    let output = git(repo_dir, &["commit", "-m", message]).await?;
    ensure_success(&output, "commit")?;

    let output = git(repo_dir, &["push"]).await?;
    ensure_success(&output, "push")?;

    info!(message, "Pushed memory changes");
    Ok(())
}
