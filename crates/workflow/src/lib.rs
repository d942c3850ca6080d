//! Eva's scheduled workflows.
//!
//! Three jobs run outside the model loop: a heartbeat that alerts on urgent
//! items, a morning brief over WhatsApp, and a weekly review by email. Each
//! one syncs the memory repository before reading and pushes after writing.

pub mod heartbeat;
pub mod morning_brief;
pub mod sync;
pub mod weekly_review;

pub use heartbeat::run_heartbeat;
pub use morning_brief::run_morning_brief;
pub use sync::{push_memory, sync_memory};
pub use weekly_review::run_weekly_review;

use eva_actions::{ActionClient, ActionError};
use eva_config::UserConfig;
use eva_core::error::MemoryError;
use eva_memory::MemoryStore;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// The named workflows a scheduler or the gateway can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Heartbeat,
    MorningBrief,
    WeeklyReview,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 3] = [
        WorkflowKind::Heartbeat,
        WorkflowKind::MorningBrief,
        WorkflowKind::WeeklyReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::Heartbeat => "heartbeat",
            WorkflowKind::MorningBrief => "morning_brief",
            WorkflowKind::WeeklyReview => "weekly_review",
        }
    }
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heartbeat" => Ok(WorkflowKind::Heartbeat),
            "morning_brief" | "morning-brief" => Ok(WorkflowKind::MorningBrief),
            "weekly_review" | "weekly-review" => Ok(WorkflowKind::WeeklyReview),
            other => Err(WorkflowError::UnknownWorkflow(other.to_string())),
        }
    }
}

/// Shared dependencies for running any workflow.
pub struct WorkflowContext {
    pub actions: ActionClient,
    pub store: Arc<MemoryStore>,
    pub repo_dir: PathBuf,
    pub user: UserConfig,
}

/// Failures running a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),

    #[error("No delivery target configured: {0}")]
    MissingTarget(String),

    #[error("Git operation failed: {0}")]
    Git(String),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Run one workflow by kind.
pub async fn run_workflow(kind: WorkflowKind, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
    match kind {
        WorkflowKind::Heartbeat => run_heartbeat(ctx).await,
        WorkflowKind::MorningBrief => run_morning_brief(ctx).await,
        WorkflowKind::WeeklyReview => run_weekly_review(ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_both_spellings() {
        assert_eq!(
            "morning_brief".parse::<WorkflowKind>().unwrap(),
            WorkflowKind::MorningBrief
        );
        assert_eq!(
            "morning-brief".parse::<WorkflowKind>().unwrap(),
            WorkflowKind::MorningBrief
        );
        assert_eq!(
            "weekly-review".parse::<WorkflowKind>().unwrap(),
            WorkflowKind::WeeklyReview
        );
        assert_eq!(
            "heartbeat".parse::<WorkflowKind>().unwrap(),
            WorkflowKind::Heartbeat
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "coffee_run".parse::<WorkflowKind>().unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownWorkflow(name) if name == "coffee_run"));
    }

    #[test]
    fn display_roundtrips() {
        for kind in WorkflowKind::ALL {
            assert_eq!(kind.as_str().parse::<WorkflowKind>().unwrap(), kind);
        }
    }
}
